//! Whole-program decoding: the version/length preamble and the instruction loop.

use tracing::debug;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::instruction::{FullInstruction, InstructionToken};
use crate::opcode::{Opcode, OpcodeClass};
use crate::options::DecodeOptions;
use crate::reader::TokenReader;

const PREAMBLE_TOKENS: usize = 2;

/// Program type from the version token (`D3D10_SB_TOKENIZED_PROGRAM_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderType {
    Pixel,
    Vertex,
    Geometry,
    Hull,
    Domain,
    Compute,
    Unknown(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderModel {
    pub major: u8,
    pub minor: u8,
}

pub fn decode_version_token(version: u32) -> (ShaderType, ShaderModel) {
    // - bits 0..=3: minor version
    // - bits 4..=7: major version
    // - bits 16..=31: program type
    let minor = (version & 0xF) as u8;
    let major = ((version >> 4) & 0xF) as u8;
    let ty = (version >> 16) as u16;

    let shader_type = match ty {
        0 => ShaderType::Pixel,
        1 => ShaderType::Vertex,
        2 => ShaderType::Geometry,
        3 => ShaderType::Hull,
        4 => ShaderType::Domain,
        5 => ShaderType::Compute,
        other => ShaderType::Unknown(other),
    };

    (shader_type, ShaderModel { major, minor })
}

/// A decoded `SHEX`/`SHDR` token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderProgram {
    pub shader_type: ShaderType,
    pub model: ShaderModel,
    /// Total program length in tokens, preamble included.
    pub declared_length: u32,
    /// Token offset of the version token within the decoded buffer.
    pub token_offset: usize,
    pub instructions: Vec<FullInstruction>,
}

impl ShaderProgram {
    pub fn version(&self) -> (u8, u8) {
        (self.model.major, self.model.minor)
    }

    /// Token offset of every instruction, relative to the version token.
    ///
    /// Multiply by 4 for byte offsets into the program.
    pub fn instruction_offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.instructions
            .iter()
            .map(|inst| inst.token_offset - self.token_offset)
    }

    /// Preamble plus every instruction's length; equals `declared_length` for a decoded program.
    pub fn total_length_in_tokens(&self) -> usize {
        PREAMBLE_TOKENS
            + self
                .instructions
                .iter()
                .map(FullInstruction::total_length_in_tokens)
                .sum::<usize>()
    }
}

/// Drives [`FullInstruction::decode`] over a whole program.
#[derive(Debug, Clone, Default)]
pub struct ProgramDecoder {
    options: DecodeOptions,
}

impl ProgramDecoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes a program starting at the first token of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<ShaderProgram, DecodeError> {
        self.decode_at(bytes, 0)
    }

    /// Decodes a program whose version token is at token index `start_token` of `bytes`.
    ///
    /// Error and instruction offsets are reported relative to the start of `bytes`.
    pub fn decode_at(&self, bytes: &[u8], start_token: usize) -> Result<ShaderProgram, DecodeError> {
        let mut reader = TokenReader::new(bytes);
        reader.seek(start_token.saturating_mul(4))?;

        let token_offset = reader.token_position();
        let version = reader.read_token()?;
        let length_at = reader.token_position();
        let declared_length = reader.read_token()?;
        if (declared_length as usize) < PREAMBLE_TOKENS {
            return Err(DecodeError::new(
                length_at,
                DecodeErrorKind::InvalidProgramLength {
                    declared: declared_length,
                },
            ));
        }
        let (shader_type, model) = decode_version_token(version);
        debug!(
            ?shader_type,
            major = model.major,
            minor = model.minor,
            declared_length,
            "decoding shader program"
        );

        let declared = declared_length as usize;
        // A buffer shorter than the declared length fails with truncation instead.
        let covers_declared = reader.remaining() / 4 >= declared - PREAMBLE_TOKENS;
        let mut tokens_read = PREAMBLE_TOKENS;
        let mut instructions = Vec::new();
        while tokens_read < declared {
            let index = instructions.len();
            if covers_declared {
                if let Some((opcode, claimed)) = claimed_length(&reader) {
                    let reached = tokens_read + claimed;
                    if reached > declared {
                        return Err(DecodeError::new(
                            reader.token_position(),
                            DecodeErrorKind::LengthOverrun {
                                declared: declared_length,
                                reached,
                            },
                        )
                        .with_opcode(opcode)
                        .with_instruction_index(index));
                    }
                }
            }
            let instruction = FullInstruction::decode(&mut reader, &self.options)
                .map_err(|e| e.with_instruction_index(index))?;
            tokens_read += instruction.total_length_in_tokens();
            instructions.push(instruction);
        }

        Ok(ShaderProgram {
            shader_type,
            model,
            declared_length,
            token_offset,
            instructions,
        })
    }
}

/// Opcode and token span the next instruction claims, read without consuming it.
///
/// `None` when the head itself does not decode; [`FullInstruction::decode`]
/// reports that. A `customdata` head whose count token is missing claims the
/// two framing tokens.
fn claimed_length(reader: &TokenReader<'_>) -> Option<(Opcode, usize)> {
    let mut ahead = reader.clone();
    let head = InstructionToken::from_token(ahead.read_token().ok()?).ok()?;
    let claimed = if head.opcode.class() == OpcodeClass::CustomData {
        ahead.read_token().map_or(2, |count| count as usize)
    } else {
        usize::from(head.length)
    };
    Some((head.opcode, claimed))
}

/// Decodes a program with the default [`DecodeOptions`].
pub fn decode_program(bytes: &[u8]) -> Result<ShaderProgram, DecodeError> {
    ProgramDecoder::default().decode(bytes)
}
