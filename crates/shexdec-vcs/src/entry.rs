use std::fmt;

use shexdec_dxbc::{DxbcError, DxbcFile};
use shexdec_sm5::{DecodeError, DecodeOptions, ShaderChunkError, ShaderProgram};
use thiserror::Error;

/// Identifies one shader inside an archive.
///
/// Keys sort by combo, then block, then shader id, which is also the order
/// [`crate::VcsArchive::entries`] yields them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryKey {
    pub combo_id: i32,
    pub block_id: u32,
    pub shader_id: u32,
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:08X}/{:08X}.{:08X}.fxc",
            self.combo_id, self.block_id, self.shader_id
        )
    }
}

/// Why a single entry failed to decode. Other entries are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("invalid DXBC container: {0}")]
    Container(#[source] DxbcError),
    #[error("DXBC is missing SHDR/SHEX shader chunk")]
    MissingShaderChunk,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ShaderChunkError> for EntryError {
    fn from(err: ShaderChunkError) -> Self {
        match err {
            ShaderChunkError::Dxbc(err) => Self::Container(err),
            ShaderChunkError::MissingShaderChunk => Self::MissingShaderChunk,
            ShaderChunkError::Decode(err) => Self::Decode(err),
        }
    }
}

/// Outcome of decoding one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub key: EntryKey,
    /// Byte offset of the entry's DXBC blob within the archive.
    pub offset: usize,
    pub result: Result<ShaderProgram, EntryError>,
}

impl EntryReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub(crate) fn decode_entry(
    data: &[u8],
    options: &DecodeOptions,
) -> Result<ShaderProgram, EntryError> {
    let dxbc = DxbcFile::parse(data).map_err(EntryError::Container)?;
    Ok(ShaderProgram::from_dxbc(&dxbc, options)?)
}
