//! Decoder for the SM4/SM5 tokenized shader program format (`SHDR`/`SHEX` chunks).
//!
//! The stream is a sequence of little-endian 32-bit tokens. Every instruction
//! starts with a head token carrying its opcode and total length; optional
//! extended opcode tokens and generic operands follow. `customdata` blocks are
//! framed by their own count token, and `DCL_*` bodies are kept as raw tokens.
//!
//! Decoding never panics on malformed input; every failure is a [`DecodeError`]
//! pointing at the offending token.

#![forbid(unsafe_code)]

mod custom_data;
mod error;
mod extension;
mod instruction;
mod opcode;
mod operand;
mod options;
mod program;
mod reader;
mod shader_chunk;

pub use crate::custom_data::{CustomDataBlock, CustomDataClass};
pub use crate::error::{DecodeError, DecodeErrorKind};
pub use crate::extension::{
    decode_chain, DimensionControls, Extension, ExtensionControls, ExtensionType,
    ResourceDimension, ReturnControls, ReturnType, SampleControls,
};
pub use crate::instruction::{FullInstruction, InstructionBody, InstructionToken, Operands};
pub use crate::opcode::{opcode_for, Opcode, OpcodeClass, OpcodeRevision};
pub use crate::operand::{
    Component, ComponentCount, ComponentMask, ComponentSelection, IndexRepresentation, Operand,
    OperandIndex, OperandType, SelectionMode,
};
pub use crate::options::DecodeOptions;
pub use crate::program::{
    decode_program, decode_version_token, ProgramDecoder, ShaderModel, ShaderProgram, ShaderType,
};
pub use crate::reader::TokenReader;
pub use crate::shader_chunk::ShaderChunkError;
