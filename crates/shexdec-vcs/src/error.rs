use thiserror::Error;

use crate::EntryKey;

/// Structural errors in a VCS archive. Any of these rejects the whole archive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VcsError {
    #[error("unexpected end of archive at byte {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },
    #[error("unsupported VCS version {version} (expected 6)")]
    UnsupportedVersion { version: u32 },
    #[error("static combo table is empty")]
    NoStaticCombos,
    #[error("static combo table must end with (-1, {file_size}), found ({combo_id}, {offset})")]
    MissingTerminator {
        combo_id: i32,
        offset: u32,
        file_size: usize,
    },
    #[error("first combo starts at byte {actual}, but the tables end at byte {expected}")]
    TableGap { expected: usize, actual: usize },
    #[error("combo {combo_id:08X} spans bytes {start}..{end}, outside the archive")]
    ComboOutOfBounds {
        combo_id: i32,
        start: usize,
        end: usize,
    },
    #[error("entry {key} ({length} bytes at {offset}) runs past the end of its combo")]
    EntryOutOfBounds {
        key: EntryKey,
        offset: usize,
        length: usize,
    },
    #[error("duplicate entry {key}")]
    DuplicateEntry { key: EntryKey },
    #[error("combo {combo_id:08X} ends with block id {block_id:08X} instead of FFFFFFFF")]
    MissingBlockTerminator { combo_id: i32, block_id: u32 },
    #[error("combo {combo_id:08X} overruns its end by {overshoot} bytes")]
    ComboOverrun { combo_id: i32, overshoot: usize },
}
