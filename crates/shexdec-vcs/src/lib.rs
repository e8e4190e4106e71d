//! Reader for version 6 VCS shader archives.
//!
//! An archive groups compiled DXBC shaders by static combo and block. Parsing
//! validates the archive layout; each entry can then be decoded into an
//! SM4/SM5 [`shexdec_sm5::ShaderProgram`] on its own, so one corrupt shader
//! never hides the rest.
#![forbid(unsafe_code)]

mod archive;
mod entry;
mod error;

pub use archive::{DuplicateCombo, StaticCombo, VcsArchive, VcsEntry, VcsHeader};
pub use entry::{EntryError, EntryKey, EntryReport};
pub use error::VcsError;
