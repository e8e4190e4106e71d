//! A safe, zero-copy walker for DirectX shader bytecode containers (`DXBC`).
//!
//! This crate is intended for parsing **untrusted** shader blobs (e.g. entries
//! pulled out of a shader archive) without panicking or reading out of bounds.
//! It only locates chunks; decoding the `SHEX`/`SHDR` token stream lives in
//! `shexdec-sm5`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod dxbc;
mod error;
mod fourcc;

/// Synthetic container builders for tests in this workspace (feature `test-utils`).
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use crate::dxbc::{DxbcChunk, DxbcFile, DxbcHeader};
pub use crate::error::DxbcError;
pub use crate::fourcc::FourCC;
