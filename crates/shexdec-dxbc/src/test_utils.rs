use crate::FourCC;

const HEADER_LEN: usize = 32;
const CHUNK_HEADER_LEN: usize = 8;

/// Lays out a well-formed `DXBC` container holding `chunks` back to back.
///
/// The checksum is zeroed and the reserved word is `1`, as fxc writes it.
///
/// # Panics
///
/// If the container would not fit the format's 32-bit size fields.
pub fn build_container(chunks: &[(FourCC, &[u8])]) -> Vec<u8> {
    let table_end = HEADER_LEN + 4 * chunks.len();
    let offsets: Vec<usize> = chunks
        .iter()
        .scan(table_end, |next, (_, data)| {
            let at = *next;
            *next += CHUNK_HEADER_LEN + data.len();
            Some(at)
        })
        .collect();
    let total_size = offsets
        .last()
        .zip(chunks.last())
        .map_or(table_end, |(at, (_, data))| at + CHUNK_HEADER_LEN + data.len());
    let word = |value: usize| u32::try_from(value).expect("container exceeds u32 range");

    let mut out = Vec::with_capacity(total_size);
    out.extend_from_slice(b"DXBC");
    out.extend_from_slice(&[0u8; 16]);
    for field in [1, word(total_size), word(chunks.len())] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    for &at in &offsets {
        out.extend_from_slice(&word(at).to_le_bytes());
    }
    for (fourcc, data) in chunks {
        out.extend_from_slice(&fourcc.0);
        out.extend_from_slice(&word(data.len()).to_le_bytes());
        out.extend_from_slice(data);
    }
    debug_assert_eq!(out.len(), total_size);
    out
}

/// Serializes 32-bit tokens as little-endian bytes.
pub fn tokens_to_bytes(tokens: &[u32]) -> Vec<u8> {
    tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
}
