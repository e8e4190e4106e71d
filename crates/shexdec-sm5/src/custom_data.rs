use crate::error::{DecodeError, DecodeErrorKind};
use crate::opcode::Opcode;
use crate::reader::TokenReader;

const CUSTOM_DATA_CLASS_SHIFT: u32 = 11;
const OPCODE_MASK: u32 = 0x3ff;

/// `D3D10_SB_CUSTOMDATA_CLASS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomDataClass {
    Comment = 0,
    DebugInfo = 1,
    Opaque = 2,
    ImmediateConstantBuffer = 3,
    ShaderMessage = 4,
    ShaderClipPlaneConstantMappings = 5,
}

impl CustomDataClass {
    pub fn from_raw(value: u32) -> Result<Self, DecodeErrorKind> {
        Ok(match value {
            0 => Self::Comment,
            1 => Self::DebugInfo,
            2 => Self::Opaque,
            3 => Self::ImmediateConstantBuffer,
            4 => Self::ShaderMessage,
            5 => Self::ShaderClipPlaneConstantMappings,
            value => return Err(DecodeErrorKind::InvalidCustomDataClass { value }),
        })
    }
}

/// A `customdata` block.
///
/// Unlike every other instruction its length lives in a second token, which
/// counts the whole block including the head and the count token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomDataBlock {
    pub class: CustomDataClass,
    pub declared_count: u32,
    pub payload: Vec<u32>,
}

impl CustomDataBlock {
    /// Decodes a block starting at its head token.
    pub fn decode(reader: &mut TokenReader<'_>) -> Result<Self, DecodeError> {
        let at = reader.token_position();
        let head = reader.read_token()?;
        let code = (head & OPCODE_MASK) as u16;
        if code != Opcode::CustomData.code() {
            return Err(DecodeError::new(at, DecodeErrorKind::UnknownOpcode { code }));
        }
        let class = CustomDataClass::from_raw(head >> CUSTOM_DATA_CLASS_SHIFT)
            .map_err(|kind| DecodeError::new(at, kind))?;

        let count_at = reader.token_position();
        let declared_count = reader.read_token()?;
        if declared_count < 2 {
            return Err(DecodeError::new(
                count_at,
                DecodeErrorKind::InvalidCustomDataLength {
                    count: declared_count,
                },
            ));
        }
        let payload = reader.read_tokens(declared_count as usize - 2)?;
        Ok(Self {
            class,
            declared_count,
            payload,
        })
    }

    pub fn total_length_in_tokens(&self) -> usize {
        self.declared_count as usize
    }

    pub fn head_token(&self) -> u32 {
        u32::from(Opcode::CustomData.code()) | (self.class as u32) << CUSTOM_DATA_CLASS_SHIFT
    }

    /// The block as it appears in the token stream.
    pub fn to_tokens(&self) -> Vec<u32> {
        let mut tokens = Vec::with_capacity(self.payload.len() + 2);
        tokens.push(self.head_token());
        tokens.push(self.declared_count);
        tokens.extend_from_slice(&self.payload);
        tokens
    }
}
