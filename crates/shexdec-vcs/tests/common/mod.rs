#![allow(dead_code)]

use shexdec_dxbc::test_utils::{build_container, tokens_to_bytes};
use shexdec_dxbc::FourCC;

pub const BLOCK_TERMINATOR: u32 = 0xffff_ffff;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Writes the block stream of one static combo.
pub struct ComboWriter {
    bytes: Vec<u8>,
}

impl ComboWriter {
    pub fn new(first_block: u32) -> Self {
        Self {
            bytes: first_block.to_le_bytes().to_vec(),
        }
    }

    pub fn shader(mut self, id: u32, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(&id.to_le_bytes());
        self.bytes.extend_from_slice(&(data.len() as u32).to_le_bytes());
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn block(self, id: u32) -> Self {
        self.raw(id)
    }

    pub fn raw(mut self, word: u32) -> Self {
        self.bytes.extend_from_slice(&word.to_le_bytes());
        self
    }

    /// Appends the closing block id.
    pub fn finish(self) -> Vec<u8> {
        self.raw(BLOCK_TERMINATOR).bytes
    }

    pub fn unterminated(self) -> Vec<u8> {
        self.bytes
    }
}

/// Lays out a version 6 archive: header, static combo table with its
/// terminator row, duplicate table, then the combo bodies back to back.
pub fn build_archive(combos: &[(i32, Vec<u8>)], duplicates: &[(u32, u32)]) -> Vec<u8> {
    let header_len = 7 * 4;
    let tables_len = (combos.len() + 1) * 8 + 4 + duplicates.len() * 8;
    let bodies_len: usize = combos.iter().map(|(_, body)| body.len()).sum();
    let file_size = (header_len + tables_len + bodies_len) as u32;

    let mut out = Vec::with_capacity(file_size as usize);
    let num_static_combos = combos.len() as u32 + 1;
    for word in [6u32, 4, 2, 0, 0, num_static_combos, 0x1234_5678] {
        out.extend_from_slice(&word.to_le_bytes());
    }

    let mut offset = (header_len + tables_len) as u32;
    for (combo_id, body) in combos {
        out.extend_from_slice(&combo_id.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        offset += body.len() as u32;
    }
    out.extend_from_slice(&(-1i32).to_le_bytes());
    out.extend_from_slice(&file_size.to_le_bytes());

    out.extend_from_slice(&(duplicates.len() as u32).to_le_bytes());
    for (combo_id, source_id) in duplicates {
        out.extend_from_slice(&combo_id.to_le_bytes());
        out.extend_from_slice(&source_id.to_le_bytes());
    }

    for (_, body) in combos {
        out.extend_from_slice(body);
    }
    out
}

/// A DXBC blob holding a one-instruction ps_5_0 program.
pub fn nop_shader() -> Vec<u8> {
    let shex = tokens_to_bytes(&[0x0000_0050, 3, 0x0100_003a]);
    build_container(&[(FourCC::SHEX, &shex)])
}

/// A DXBC blob whose program uses an unassigned opcode.
pub fn bad_opcode_shader() -> Vec<u8> {
    let shex = tokens_to_bytes(&[0x0000_0050, 4, 0x0100_003a, 0x0100_00ff]);
    build_container(&[(FourCC::SHEX, &shex)])
}
