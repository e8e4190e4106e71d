use std::collections::BTreeMap;
use std::ops::Range;

use shexdec_sm5::{DecodeOptions, ShaderProgram};
use tracing::{debug, warn};

use crate::entry::{decode_entry, EntryError, EntryKey, EntryReport};
use crate::error::VcsError;

const VCS_VERSION: u32 = 6;
const STATIC_COMBO_TERMINATOR: i32 = -1;
const BLOCK_TERMINATOR: u32 = 0xFFFF_FFFF;
/// Ids above this start a new block instead of naming a shader.
const MAX_SHADER_ID: u32 = 127;

/// The fixed archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcsHeader {
    pub version: u32,
    pub num_combos: i32,
    pub num_dynamic_combos: i32,
    pub flags: u32,
    pub centroid_mask: u32,
    /// Rows in the static combo table, terminator row included.
    pub num_static_combos: u32,
    pub crc: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticCombo {
    pub combo_id: i32,
    /// Byte offset of the combo's first block.
    pub offset: u32,
}

/// A combo whose shaders are shared with `source_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateCombo {
    pub combo_id: u32,
    pub source_id: u32,
}

/// One shader blob inside the archive.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VcsEntry<'a> {
    pub key: EntryKey,
    /// Byte offset of `data` within the archive.
    pub offset: usize,
    pub data: &'a [u8],
}

impl std::fmt::Debug for VcsEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VcsEntry")
            .field("key", &self.key)
            .field("offset", &self.offset)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// A parsed version 6 VCS archive.
///
/// Parsing validates the combo tables and every entry's byte range; the DXBC
/// blobs themselves are only looked at by [`VcsArchive::decode_all`].
#[derive(Debug, Clone)]
pub struct VcsArchive<'a> {
    bytes: &'a [u8],
    header: VcsHeader,
    static_combos: Vec<StaticCombo>,
    duplicates: Vec<DuplicateCombo>,
    entries: BTreeMap<EntryKey, Range<usize>>,
}

impl<'a> VcsArchive<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, VcsError> {
        let mut cur = Cursor::new(bytes);
        let header = VcsHeader {
            version: cur.read_u32()?,
            num_combos: cur.read_i32()?,
            num_dynamic_combos: cur.read_i32()?,
            flags: cur.read_u32()?,
            centroid_mask: cur.read_u32()?,
            num_static_combos: cur.read_u32()?,
            crc: cur.read_u32()?,
        };
        if header.version != VCS_VERSION {
            return Err(VcsError::UnsupportedVersion {
                version: header.version,
            });
        }
        if header.num_static_combos == 0 {
            return Err(VcsError::NoStaticCombos);
        }

        let rows = header.num_static_combos as usize;
        cur.ensure(rows.saturating_mul(8))?;
        let mut static_combos = Vec::with_capacity(rows);
        for _ in 0..rows {
            static_combos.push(StaticCombo {
                combo_id: cur.read_i32()?,
                offset: cur.read_u32()?,
            });
        }
        match static_combos.pop() {
            Some(StaticCombo { combo_id, offset })
                if combo_id == STATIC_COMBO_TERMINATOR && offset as usize == bytes.len() => {}
            Some(StaticCombo { combo_id, offset }) => {
                return Err(VcsError::MissingTerminator {
                    combo_id,
                    offset,
                    file_size: bytes.len(),
                })
            }
            None => return Err(VcsError::NoStaticCombos),
        }

        let num_duplicates = cur.read_u32()? as usize;
        cur.ensure(num_duplicates.saturating_mul(8))?;
        let mut duplicates = Vec::with_capacity(num_duplicates);
        for _ in 0..num_duplicates {
            duplicates.push(DuplicateCombo {
                combo_id: cur.read_u32()?,
                source_id: cur.read_u32()?,
            });
        }

        let tables_end = cur.position();
        let first_block = static_combos
            .first()
            .map_or(bytes.len(), |combo| combo.offset as usize);
        if first_block != tables_end {
            return Err(VcsError::TableGap {
                expected: tables_end,
                actual: first_block,
            });
        }

        let mut entries = BTreeMap::new();
        for (i, combo) in static_combos.iter().enumerate() {
            let start = combo.offset as usize;
            let end = static_combos
                .get(i + 1)
                .map_or(bytes.len(), |next| next.offset as usize);
            if start > end || end > bytes.len() {
                return Err(VcsError::ComboOutOfBounds {
                    combo_id: combo.combo_id,
                    start,
                    end,
                });
            }
            cur.seek(start);
            read_combo(&mut cur, combo.combo_id, end, &mut entries)?;
        }

        debug!(
            static_combos = static_combos.len(),
            duplicates = duplicates.len(),
            entries = entries.len(),
            "parsed VCS archive"
        );
        Ok(Self {
            bytes,
            header,
            static_combos,
            duplicates,
            entries,
        })
    }

    pub fn header(&self) -> &VcsHeader {
        &self.header
    }

    /// Static combos in table order, terminator row removed.
    pub fn static_combos(&self) -> &[StaticCombo] {
        &self.static_combos
    }

    pub fn duplicates(&self) -> &[DuplicateCombo] {
        &self.duplicates
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every shader entry, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = VcsEntry<'a>> + '_ {
        let bytes = self.bytes;
        self.entries.iter().map(move |(key, range)| VcsEntry {
            key: *key,
            offset: range.start,
            data: &bytes[range.clone()],
        })
    }

    pub fn entry_bytes(&self, key: &EntryKey) -> Option<&'a [u8]> {
        let range = self.entries.get(key)?;
        self.bytes.get(range.clone())
    }

    /// Decodes one entry's shader program.
    pub fn decode_entry(
        &self,
        key: &EntryKey,
        options: &DecodeOptions,
    ) -> Option<Result<ShaderProgram, EntryError>> {
        self.entry_bytes(key).map(|data| decode_entry(data, options))
    }

    /// Decodes every entry independently; a bad shader only fails its own report.
    pub fn decode_all(&self, options: &DecodeOptions) -> Vec<EntryReport> {
        self.entries()
            .map(|entry| {
                let result = decode_entry(entry.data, options);
                if let Err(error) = &result {
                    warn!(entry = %entry.key, offset = entry.offset, %error, "failed to decode shader entry");
                }
                EntryReport {
                    key: entry.key,
                    offset: entry.offset,
                    result,
                }
            })
            .collect()
    }
}

/// Reads one combo's blocks, which must end exactly at `end`.
fn read_combo(
    cur: &mut Cursor<'_>,
    combo_id: i32,
    end: usize,
    entries: &mut BTreeMap<EntryKey, Range<usize>>,
) -> Result<(), VcsError> {
    let mut block_id = cur.read_u32()?;
    while cur.position() < end {
        let id = cur.read_u32()?;
        if id > MAX_SHADER_ID {
            block_id = id;
            continue;
        }
        let length = cur.read_u32()? as usize;
        let offset = cur.position();
        let key = EntryKey {
            combo_id,
            block_id,
            shader_id: id,
        };
        let data_end = offset
            .checked_add(length)
            .filter(|&data_end| data_end <= end)
            .ok_or(VcsError::EntryOutOfBounds {
                key,
                offset,
                length,
            })?;
        if entries.insert(key, offset..data_end).is_some() {
            return Err(VcsError::DuplicateEntry { key });
        }
        cur.seek(data_end);
    }
    if block_id != BLOCK_TERMINATOR {
        return Err(VcsError::MissingBlockTerminator { combo_id, block_id });
    }
    if cur.position() > end {
        return Err(VcsError::ComboOverrun {
            combo_id,
            overshoot: cur.position() - end,
        });
    }
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn ensure(&self, len: usize) -> Result<(), VcsError> {
        let available = self.bytes.len().saturating_sub(self.pos);
        if len > available {
            return Err(VcsError::Truncated {
                offset: self.pos,
                needed: len - available,
            });
        }
        Ok(())
    }

    fn read_u32(&mut self) -> Result<u32, VcsError> {
        self.ensure(4)?;
        let b = &self.bytes[self.pos..self.pos + 4];
        self.pos += 4;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, VcsError> {
        self.read_u32().map(|v| v as i32)
    }
}
