//! Single-instruction decoding.

use tracing::{debug, trace};

use crate::custom_data::CustomDataBlock;
use crate::error::{DecodeError, DecodeErrorKind};
use crate::extension::{decode_chain, Extension};
use crate::opcode::{opcode_for, Opcode, OpcodeClass};
use crate::operand::Operand;
use crate::options::DecodeOptions;
use crate::reader::TokenReader;

const OPCODE_MASK: u32 = 0x3ff;
const OPCODE_CONTROLS_SHIFT: u32 = 11;
const OPCODE_CONTROLS_MASK: u32 = 0x1fff;
const OPCODE_LEN_SHIFT: u32 = 24;
const OPCODE_LEN_MASK: u32 = 0x7f;
const OPCODE_EXTENDED_BIT: u32 = 0x8000_0000;

/// The head token of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionToken {
    pub opcode: Opcode,
    /// Opcode-specific control bits (saturate, test boolean, resinfo return type, ...).
    pub controls: u16,
    /// Total instruction length in tokens, head included. Unused by `customdata`.
    pub length: u8,
    pub is_extended: bool,
}

impl InstructionToken {
    pub fn from_token(token: u32) -> Result<Self, DecodeErrorKind> {
        Ok(Self {
            opcode: opcode_for((token & OPCODE_MASK) as u16)?,
            controls: ((token >> OPCODE_CONTROLS_SHIFT) & OPCODE_CONTROLS_MASK) as u16,
            length: ((token >> OPCODE_LEN_SHIFT) & OPCODE_LEN_MASK) as u8,
            is_extended: token & OPCODE_EXTENDED_BIT != 0,
        })
    }

    pub fn to_token(&self) -> u32 {
        let mut token = u32::from(self.opcode.code())
            | (u32::from(self.controls) & OPCODE_CONTROLS_MASK) << OPCODE_CONTROLS_SHIFT
            | (u32::from(self.length) & OPCODE_LEN_MASK) << OPCODE_LEN_SHIFT;
        if self.is_extended {
            token |= OPCODE_EXTENDED_BIT;
        }
        token
    }
}

/// Operands of a standard instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    Structured(Vec<Operand>),
    /// Operand tokens kept verbatim because structured decoding failed.
    ///
    /// Only produced when [`DecodeOptions::raw_operand_fallback`] is enabled.
    Raw { tokens: Vec<u32>, error: DecodeError },
}

impl Operands {
    pub fn token_len(&self) -> usize {
        match self {
            Self::Structured(operands) => operands.iter().map(Operand::token_len).sum(),
            Self::Raw { tokens, .. } => tokens.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionBody {
    Standard {
        extensions: Vec<Extension>,
        operands: Operands,
    },
    /// `DCL_*` body, kept as the raw tokens following the extension chain.
    Declaration {
        extensions: Vec<Extension>,
        tokens: Vec<u32>,
    },
    CustomData(CustomDataBlock),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullInstruction {
    /// Token offset of the head token from the start of the decoded buffer.
    pub token_offset: usize,
    pub head: InstructionToken,
    pub body: InstructionBody,
}

impl FullInstruction {
    pub fn decode(
        reader: &mut TokenReader<'_>,
        options: &DecodeOptions,
    ) -> Result<Self, DecodeError> {
        let token_offset = reader.token_position();
        let start = reader.position();
        let token = reader.read_token()?;
        let head =
            InstructionToken::from_token(token).map_err(|kind| DecodeError::new(token_offset, kind))?;
        let opcode = head.opcode;

        let body = decode_body(reader, start, token_offset, &head, options)
            .map_err(|e| e.with_opcode(opcode))?;
        let instruction = Self {
            token_offset,
            head,
            body,
        };
        trace!(
            offset = token_offset,
            opcode = %opcode,
            length = instruction.total_length_in_tokens(),
            "decoded instruction"
        );
        Ok(instruction)
    }

    pub fn opcode(&self) -> Opcode {
        self.head.opcode
    }

    /// Tokens spanned by this instruction, from its head to the next instruction.
    pub fn total_length_in_tokens(&self) -> usize {
        match &self.body {
            InstructionBody::CustomData(block) => block.total_length_in_tokens(),
            InstructionBody::Standard { .. } | InstructionBody::Declaration { .. } => {
                usize::from(self.head.length)
            }
        }
    }

    pub fn extensions(&self) -> &[Extension] {
        match &self.body {
            InstructionBody::Standard { extensions, .. }
            | InstructionBody::Declaration { extensions, .. } => extensions,
            InstructionBody::CustomData(_) => &[],
        }
    }

    /// Structured operands, if this is a standard instruction whose operands decoded.
    pub fn operands(&self) -> Option<&[Operand]> {
        match &self.body {
            InstructionBody::Standard {
                operands: Operands::Structured(operands),
                ..
            } => Some(operands),
            _ => None,
        }
    }

    pub fn custom_data(&self) -> Option<&CustomDataBlock> {
        match &self.body {
            InstructionBody::CustomData(block) => Some(block),
            _ => None,
        }
    }

    /// Tokens following the head and extension chain.
    pub fn body_token_len(&self) -> usize {
        match &self.body {
            InstructionBody::Standard { operands, .. } => operands.token_len(),
            InstructionBody::Declaration { tokens, .. } => tokens.len(),
            InstructionBody::CustomData(block) => block.payload.len() + 1,
        }
    }
}

fn decode_body(
    reader: &mut TokenReader<'_>,
    start: usize,
    at: usize,
    head: &InstructionToken,
    options: &DecodeOptions,
) -> Result<InstructionBody, DecodeError> {
    let class = head.opcode.class();
    if class == OpcodeClass::CustomData {
        reader.seek(start)?;
        return CustomDataBlock::decode(reader).map(InstructionBody::CustomData);
    }

    if head.length == 0 {
        return Err(DecodeError::new(at, DecodeErrorKind::InvalidLength));
    }
    let (extensions, consumed) = decode_chain(reader, head.is_extended)?;
    let length = usize::from(head.length);
    if 1 + consumed > length {
        return Err(DecodeError::new(
            at,
            DecodeErrorKind::ExtensionsExceedLength {
                length: head.length,
                extensions: consumed,
            },
        ));
    }
    let remaining = length - 1 - consumed;

    if class == OpcodeClass::Declaration {
        let tokens = reader.read_tokens(remaining)?;
        return Ok(InstructionBody::Declaration { extensions, tokens });
    }

    let mut window = reader.split_tokens(remaining)?;
    let operands = match decode_operands(window.clone(), remaining, options) {
        Ok(operands) => Operands::Structured(operands),
        Err(error) if options.raw_operand_fallback => {
            let error = error.with_opcode(head.opcode);
            debug!(
                offset = at,
                opcode = %head.opcode,
                %error,
                "keeping raw operand tokens"
            );
            let tokens = window.read_tokens(remaining)?;
            Operands::Raw { tokens, error }
        }
        Err(error) => return Err(error),
    };
    Ok(InstructionBody::Standard {
        extensions,
        operands,
    })
}

/// Decodes operands until the `expected`-token window is exhausted.
fn decode_operands(
    mut window: TokenReader<'_>,
    expected: usize,
    options: &DecodeOptions,
) -> Result<Vec<Operand>, DecodeError> {
    let mut operands = Vec::new();
    while !window.is_empty() {
        match Operand::decode(&mut window, options.strict_selection_bits) {
            Ok(operand) => operands.push(operand),
            Err(e) => return Err(overshoot_to_mismatch(e, expected)),
        }
    }
    Ok(operands)
}

/// Running out of tokens inside the operand window means the operands claim
/// more tokens than the instruction length leaves them.
fn overshoot_to_mismatch(error: DecodeError, expected: usize) -> DecodeError {
    match error.kind {
        DecodeErrorKind::TruncatedInput { needed, available } => {
            let missing = needed.saturating_sub(available).div_ceil(4);
            DecodeError::new(
                error.at_token,
                DecodeErrorKind::OperandLengthMismatch {
                    expected,
                    consumed: expected.saturating_add(missing),
                },
            )
        }
        _ => error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionControls;
    use crate::extension::SampleControls;
    use crate::operand::OperandType;
    use pretty_assertions::assert_eq;

    fn le_bytes(tokens: &[u32]) -> Vec<u8> {
        tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
    }

    fn opcode_token(opcode: Opcode, len: u32) -> u32 {
        u32::from(opcode.code()) | len << 24
    }

    fn decode_with(tokens: &[u32], options: DecodeOptions) -> Result<FullInstruction, DecodeError> {
        let bytes = le_bytes(tokens);
        let mut r = TokenReader::new(&bytes);
        let inst = FullInstruction::decode(&mut r, &options)?;
        assert_eq!(r.token_position(), inst.total_length_in_tokens());
        Ok(inst)
    }

    fn decode(tokens: &[u32]) -> Result<FullInstruction, DecodeError> {
        decode_with(tokens, DecodeOptions::default())
    }

    const DST_R0_XYZW: u32 = 0x0010_00f2;
    const SRC_R1_XYZW: u32 = 0x0010_0e46;

    #[test]
    fn nop() {
        let inst = decode(&[0x0100_003a]).unwrap();
        assert_eq!(
            inst.head,
            InstructionToken {
                opcode: Opcode::Nop,
                controls: 0,
                length: 1,
                is_extended: false,
            }
        );
        assert!(inst.extensions().is_empty());
        assert_eq!(inst.operands(), Some(&[][..]));
        assert_eq!(inst.total_length_in_tokens(), 1);
    }

    #[test]
    fn mov_register_operands() {
        let inst = decode(&[opcode_token(Opcode::Mov, 5), DST_R0_XYZW, 0, SRC_R1_XYZW, 1]).unwrap();
        let ops = inst.operands().unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].ty, OperandType::Temp);
        assert!(ops[0].mask().unwrap().is_all());
        assert_eq!(ops[1].swizzle().map(|s| s.len()), Some(4));
        assert_eq!(1 + inst.extensions().len() + inst.body_token_len(), 5);
    }

    #[test]
    fn controls_survive_round_trip() {
        // saturate bit
        let token = opcode_token(Opcode::Add, 7) | 1 << 13;
        let head = InstructionToken::from_token(token).unwrap();
        assert_eq!(head.controls, 0b100);
        assert_eq!(head.to_token(), token);
    }

    #[test]
    fn extension_chain_counts_toward_length() {
        let sample = 1 | 0x1 << 9;
        let tokens = [
            opcode_token(Opcode::Sample, 3) | OPCODE_EXTENDED_BIT,
            sample,
            0x0000_d000, // null operand
        ];
        let inst = decode(&tokens).unwrap();
        assert_eq!(
            inst.extensions()[0].controls,
            ExtensionControls::Sample(SampleControls { u: 1, v: 0, w: 0 })
        );
        assert_eq!(inst.operands().unwrap()[0].ty, OperandType::Null);
    }

    #[test]
    fn zero_length_rejected() {
        let err = decode(&[opcode_token(Opcode::Mov, 0)]).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::InvalidLength);
        assert_eq!(err.opcode, Some(Opcode::Mov));
    }

    #[test]
    fn extensions_longer_than_instruction() {
        let tokens = [opcode_token(Opcode::Mov, 1) | OPCODE_EXTENDED_BIT, 0];
        assert_eq!(
            decode(&tokens).unwrap_err().kind,
            DecodeErrorKind::ExtensionsExceedLength {
                length: 1,
                extensions: 1
            }
        );
    }

    #[test]
    fn custom_data_ignores_head_length() {
        let inst = decode(&[0x35, 3, 0xabcd]).unwrap();
        let block = inst.custom_data().unwrap();
        assert_eq!(block.declared_count, 3);
        assert_eq!(block.payload, vec![0xabcd]);
        assert_eq!(inst.total_length_in_tokens(), 3);
        assert!(inst.operands().is_none());
    }

    #[test]
    fn declaration_body_is_skipped_by_length() {
        // dcl_resource_texture2d (float,float,float,float) t0
        let tokens = [opcode_token(Opcode::DclResource, 4) | 3 << 11, 0x0010_7000, 0, 0x5555];
        let inst = decode(&tokens).unwrap();
        let InstructionBody::Declaration { extensions, tokens } = &inst.body else {
            panic!("expected declaration, got {:?}", inst.body);
        };
        assert!(extensions.is_empty());
        assert_eq!(tokens, &vec![0x0010_7000, 0, 0x5555]);
    }

    #[test]
    fn operand_overshoot_is_length_mismatch() {
        // src operand wants an index token that the instruction length does not cover
        let tokens = [opcode_token(Opcode::Mov, 4), DST_R0_XYZW, 0, SRC_R1_XYZW, 1];
        let err = decode(&tokens).unwrap_err();
        assert_eq!(
            err.kind,
            DecodeErrorKind::OperandLengthMismatch {
                expected: 3,
                consumed: 4
            }
        );
        assert_eq!(err.at_token, 4);
        assert_eq!(err.opcode, Some(Opcode::Mov));
    }

    #[test]
    fn raw_fallback_keeps_tokens_and_error() {
        let tokens = [opcode_token(Opcode::Mov, 3), 3 << 20, 0];
        let options = DecodeOptions::default().with_raw_operand_fallback(true);
        let inst = decode_with(&tokens, options).unwrap();
        let InstructionBody::Standard {
            operands: Operands::Raw { tokens, error },
            ..
        } = &inst.body
        else {
            panic!("expected raw operands, got {:?}", inst.body);
        };
        assert_eq!(tokens, &vec![3 << 20, 0]);
        assert_eq!(error.opcode, Some(Opcode::Mov));
        assert_eq!(error.kind, DecodeErrorKind::InvalidIndexDimension { dim: 3 });
        assert_eq!(error.at_token, 1);
        assert!(inst.operands().is_none());
    }

    #[test]
    fn window_past_buffer_is_truncation_even_with_fallback() {
        let tokens = [opcode_token(Opcode::Mov, 5), DST_R0_XYZW, 0];
        let options = DecodeOptions::default().with_raw_operand_fallback(true);
        assert!(decode_with(&tokens, options).unwrap_err().is_truncation());
    }

    #[test]
    fn unknown_opcode_has_no_opcode_context() {
        let err = decode(&[0x0100_00ff]).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::UnknownOpcode { code: 0xff });
        assert_eq!(err.opcode, None);
        assert_eq!(err.at_token, 0);
    }
}
