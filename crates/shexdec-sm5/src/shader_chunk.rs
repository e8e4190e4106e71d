use shexdec_dxbc::{DxbcError, DxbcFile, FourCC};
use thiserror::Error;

use crate::error::DecodeError;
use crate::options::DecodeOptions;
use crate::program::{ProgramDecoder, ShaderProgram};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderChunkError {
    #[error(transparent)]
    Dxbc(#[from] DxbcError),
    #[error("DXBC is missing SHDR/SHEX shader chunk")]
    MissingShaderChunk,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl ShaderProgram {
    /// Decodes the shader token stream of a parsed container.
    pub fn from_dxbc(
        dxbc: &DxbcFile<'_>,
        options: &DecodeOptions,
    ) -> Result<Self, ShaderChunkError> {
        // SM4 uses SHDR, SM5 uses SHEX; accept either (prefer SHEX if present).
        let chunk = dxbc
            .get_chunk(FourCC::SHEX)
            .or_else(|| dxbc.get_chunk(FourCC::SHDR))
            .ok_or(ShaderChunkError::MissingShaderChunk)?;
        Ok(ProgramDecoder::new(*options).decode(chunk.data)?)
    }

    pub fn from_dxbc_bytes(bytes: &[u8], options: &DecodeOptions) -> Result<Self, ShaderChunkError> {
        let dxbc = DxbcFile::parse(bytes)?;
        Self::from_dxbc(&dxbc, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shexdec_dxbc::test_utils::{build_container, tokens_to_bytes};

    #[test]
    fn prefers_shex_over_shdr() {
        let shdr = tokens_to_bytes(&[0x0000_0040, 2]);
        let shex = tokens_to_bytes(&[0x0001_0050, 3, 0x0100_003a]);
        let bytes = build_container(&[(FourCC::SHDR, &shdr), (FourCC::SHEX, &shex)]);
        let program = ShaderProgram::from_dxbc_bytes(&bytes, &DecodeOptions::default()).unwrap();
        assert_eq!(program.version(), (5, 0));
        assert_eq!(program.instructions.len(), 1);
    }

    #[test]
    fn falls_back_to_shdr() {
        let shdr = tokens_to_bytes(&[0x0000_0040, 2]);
        let bytes = build_container(&[(FourCC(*b"RDEF"), &[0u8; 4]), (FourCC::SHDR, &shdr)]);
        let dxbc = DxbcFile::parse(&bytes).unwrap();
        let program = ShaderProgram::from_dxbc(&dxbc, &DecodeOptions::default()).unwrap();
        assert_eq!(program.version(), (4, 0));
    }

    #[test]
    fn missing_chunk() {
        let bytes = build_container(&[(FourCC(*b"RDEF"), &[0u8; 4])]);
        assert_eq!(
            ShaderProgram::from_dxbc_bytes(&bytes, &DecodeOptions::default()),
            Err(ShaderChunkError::MissingShaderChunk)
        );
    }

    #[test]
    fn decode_errors_are_wrapped() {
        let shex = tokens_to_bytes(&[0x0000_0050, 1]);
        let bytes = build_container(&[(FourCC::SHEX, &shex)]);
        let err = ShaderProgram::from_dxbc_bytes(&bytes, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, ShaderChunkError::Decode(_)));
    }
}
