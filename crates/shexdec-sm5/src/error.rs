use core::fmt;

use thiserror::Error;

use crate::opcode::Opcode;

/// A decode failure, with enough context to point at the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// Token offset (from the start of the decoded program) at which the failing token was read.
    pub at_token: usize,
    /// Index of the instruction being decoded, when the failure happened inside a program.
    pub instruction_index: Option<usize>,
    /// Opcode of the instruction being decoded, once its head token was understood.
    pub opcode: Option<Opcode>,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(at_token: usize, kind: DecodeErrorKind) -> Self {
        Self {
            at_token,
            instruction_index: None,
            opcode: None,
            kind,
        }
    }

    pub(crate) fn with_opcode(mut self, opcode: Opcode) -> Self {
        self.opcode.get_or_insert(opcode);
        self
    }

    pub(crate) fn with_instruction_index(mut self, index: usize) -> Self {
        self.instruction_index.get_or_insert(index);
        self
    }

    /// Returns `true` if the input simply ended early.
    pub fn is_truncation(&self) -> bool {
        matches!(self.kind, DecodeErrorKind::TruncatedInput { .. })
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SM4/5 decode error at token {}", self.at_token)?;
        match (self.instruction_index, self.opcode) {
            (Some(index), Some(opcode)) => write!(f, " (instruction {index}, {opcode})")?,
            (Some(index), None) => write!(f, " (instruction {index})")?,
            (None, Some(opcode)) => write!(f, " ({opcode})")?,
            (None, None) => {}
        }
        write!(f, ": {}", self.kind)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("unexpected end of input (needed {needed} bytes, {available} available)")]
    TruncatedInput { needed: usize, available: usize },
    #[error("unknown opcode 0x{code:03x}")]
    UnknownOpcode { code: u16 },
    #[error("instruction length is zero")]
    InvalidLength,
    #[error("{extensions} extended opcode tokens do not fit in an instruction of length {length}")]
    ExtensionsExceedLength { length: u8, extensions: usize },
    #[error("invalid extended opcode type {ty}")]
    InvalidExtensionType { ty: u32 },
    #[error("reserved bits set in {field} (0x{bits:08x})")]
    ReservedBitsSet { field: &'static str, bits: u32 },
    #[error("invalid resource dimension {value}")]
    InvalidResourceDimension { value: u32 },
    #[error("invalid resource return type {value}")]
    InvalidReturnType { value: u32 },
    #[error("invalid custom data class {value}")]
    InvalidCustomDataClass { value: u32 },
    #[error("custom data block declares {count} tokens (minimum is 2)")]
    InvalidCustomDataLength { count: u32 },
    #[error("operand uses the reserved component count encoding")]
    ReservedComponentCount,
    #[error("invalid component selection mode {mode}")]
    InvalidSelectionMode { mode: u32 },
    #[error("component selection bits 0x{bits:03x} set on an operand with fewer than four components")]
    NonZeroSelectionBits { bits: u32 },
    #[error("invalid operand type {ty}")]
    InvalidOperandType { ty: u32 },
    #[error("invalid operand index dimension {dim}")]
    InvalidIndexDimension { dim: u32 },
    #[error("invalid operand index representation {rep}")]
    InvalidIndexRepresentation { rep: u32 },
    #[error("extended operand tokens are not supported")]
    ExtendedOperandUnsupported,
    #[error("relative index register itself uses a relative index")]
    NestedRelativeIndex,
    #[error("operands consumed {consumed} tokens but the instruction declares {expected}")]
    OperandLengthMismatch { expected: usize, consumed: usize },
    #[error("declared program length {declared} is below the 2-token preamble")]
    InvalidProgramLength { declared: u32 },
    #[error("instruction stream reached {reached} tokens, past the declared length {declared}")]
    LengthOverrun { declared: u32, reached: usize },
}
