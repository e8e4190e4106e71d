/// Knobs for how strictly a token stream is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Keep an instruction's operand tokens unparsed (and the error that
    /// stopped parsing) instead of failing the whole decode.
    pub raw_operand_fallback: bool,
    /// Reject zero- and one-component operands whose unused selection bits are set.
    pub strict_selection_bits: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            raw_operand_fallback: false,
            strict_selection_bits: true,
        }
    }
}

impl DecodeOptions {
    pub fn with_raw_operand_fallback(mut self, enabled: bool) -> Self {
        self.raw_operand_fallback = enabled;
        self
    }

    pub fn with_strict_selection_bits(mut self, enabled: bool) -> Self {
        self.strict_selection_bits = enabled;
        self
    }
}
