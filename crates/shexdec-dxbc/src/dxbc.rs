use crate::error::DxbcError;
use crate::fourcc::FourCC;
use core::fmt;
use tracing::debug;

const DXBC_MAGIC: FourCC = FourCC(*b"DXBC");
// magic, checksum, reserved, total_size, chunk_count
const DXBC_HEADER_LEN: usize = 32;
const CHUNK_HEADER_LEN: usize = 8;
const MAX_DXBC_CHUNK_COUNT: u32 = 4096;

/// The fixed header of a `DXBC` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DxbcHeader {
    /// Must be [`FourCC(*b"DXBC")`].
    pub magic: FourCC,
    /// The checksum stored in the container header. It is carried through, never verified.
    pub checksum: [u8; 16],
    /// The reserved word after the checksum (`1` in every compiler output seen so far).
    pub reserved: u32,
    /// Declared total size, in bytes, of this `DXBC` container.
    pub total_size: u32,
    /// Number of chunk offsets following the header.
    pub chunk_count: u32,
}

/// A single chunk within a `DXBC` container.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct DxbcChunk<'a> {
    /// The chunk identifier (e.g. `SHDR`, `SHEX`, `RDEF`).
    pub fourcc: FourCC,
    /// Byte offset of the chunk payload from the start of the container.
    pub offset: usize,
    /// Raw chunk payload bytes.
    pub data: &'a [u8],
}

impl fmt::Debug for DxbcChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DxbcChunk")
            .field("fourcc", &self.fourcc)
            .field("offset", &self.offset)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// A parsed `DXBC` container.
///
/// Every chunk is located and bounds-checked during [`DxbcFile::parse`]; lookups
/// afterwards are plain slice walks. Chunks must lie inside the declared
/// `total_size` and may not start inside another chunk.
#[derive(Debug, Clone)]
pub struct DxbcFile<'a> {
    bytes: &'a [u8],
    header: DxbcHeader,
    chunks: Vec<DxbcChunk<'a>>,
}

impl<'a> DxbcFile<'a> {
    /// Parses an untrusted `DXBC` blob. Never panics on malformed input.
    pub fn parse(bytes: &'a [u8]) -> Result<DxbcFile<'a>, DxbcError> {
        let header = DxbcHeader::parse(bytes)?;
        let bytes = &bytes[..header.total_size as usize];

        // chunk_count is capped, so the table end cannot overflow.
        let table_end = DXBC_HEADER_LEN + header.chunk_count as usize * 4;
        if table_end > bytes.len() {
            return Err(DxbcError::malformed_offsets(format!(
                "{} chunk offsets need {table_end} bytes, container has {}",
                header.chunk_count,
                bytes.len()
            )));
        }

        let mut chunks = Vec::with_capacity(header.chunk_count as usize);
        for index in 0..header.chunk_count as usize {
            let at = read_u32_le(bytes, DXBC_HEADER_LEN + index * 4)? as usize;
            if at < table_end {
                return Err(DxbcError::malformed_offsets(format!(
                    "chunk {index} at {at} overlaps the offset table ending at {table_end}"
                )));
            }
            let chunk = read_chunk(bytes, at).map_err(|err| {
                DxbcError::out_of_bounds(format!("chunk {index}: {}", err.context()))
            })?;
            chunks.push(chunk);
        }
        check_chunk_overlap(&chunks)?;

        debug!(
            total_size = header.total_size,
            chunk_count = header.chunk_count,
            "parsed DXBC container"
        );
        Ok(DxbcFile {
            bytes,
            header,
            chunks,
        })
    }

    /// The validated container header.
    pub fn header(&self) -> &DxbcHeader {
        &self.header
    }

    /// The container bytes, cut to the declared `total_size`.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Chunks in offset-table order.
    pub fn chunks(&self) -> impl Iterator<Item = DxbcChunk<'a>> + '_ {
        self.chunks.iter().copied()
    }

    /// First chunk tagged `fourcc`.
    pub fn get_chunk(&self, fourcc: FourCC) -> Option<DxbcChunk<'a>> {
        self.chunks().find(|chunk| chunk.fourcc == fourcc)
    }

    /// Every chunk tagged `fourcc`, in table order.
    pub fn get_chunks(&self, fourcc: FourCC) -> impl Iterator<Item = DxbcChunk<'a>> + '_ {
        self.chunks().filter(move |chunk| chunk.fourcc == fourcc)
    }

    /// First `SHEX` or `SHDR` chunk in table order.
    pub fn find_first_shader_chunk(&self) -> Option<DxbcChunk<'a>> {
        self.chunks()
            .find(|chunk| chunk.fourcc == FourCC::SHEX || chunk.fourcc == FourCC::SHDR)
    }

    /// One line for the header, then one per chunk.
    pub fn debug_summary(&self) -> String {
        let mut lines = vec![format!(
            "{} total_size={} chunk_count={}",
            self.header.magic, self.header.total_size, self.header.chunk_count
        )];
        lines.extend(self.chunks.iter().enumerate().map(|(index, chunk)| {
            format!(
                "  [{index:02}] {} @ 0x{:x} {} bytes",
                chunk.fourcc,
                chunk.offset,
                chunk.data.len()
            )
        }));
        lines.join("\n")
    }
}

impl DxbcHeader {
    fn parse(bytes: &[u8]) -> Result<Self, DxbcError> {
        if bytes.len() < DXBC_HEADER_LEN {
            return Err(DxbcError::malformed_header(format!(
                "{} bytes is shorter than the {DXBC_HEADER_LEN}-byte header",
                bytes.len()
            )));
        }
        let header = DxbcHeader {
            magic: FourCC(read_array::<4>(bytes, 0)?),
            checksum: read_array::<16>(bytes, 4)?,
            reserved: read_u32_le(bytes, 20)?,
            total_size: read_u32_le(bytes, 24)?,
            chunk_count: read_u32_le(bytes, 28)?,
        };
        if header.magic != DXBC_MAGIC {
            return Err(DxbcError::malformed_header(format!(
                "magic is {}, not {DXBC_MAGIC}",
                header.magic
            )));
        }
        if header.chunk_count > MAX_DXBC_CHUNK_COUNT {
            return Err(DxbcError::malformed_offsets(format!(
                "{} chunks is more than the {MAX_DXBC_CHUNK_COUNT} allowed",
                header.chunk_count
            )));
        }
        let total_size = header.total_size as usize;
        if total_size < DXBC_HEADER_LEN {
            return Err(DxbcError::malformed_header(format!(
                "total_size {total_size} is shorter than the header"
            )));
        }
        if total_size > bytes.len() {
            return Err(DxbcError::out_of_bounds(format!(
                "total_size {total_size} but only {} bytes available",
                bytes.len()
            )));
        }
        Ok(header)
    }
}

/// Rejects a chunk whose header starts inside another chunk.
fn check_chunk_overlap(chunks: &[DxbcChunk<'_>]) -> Result<(), DxbcError> {
    let mut spans: Vec<(usize, usize, usize)> = chunks
        .iter()
        .enumerate()
        .map(|(index, chunk)| {
            let start = chunk.offset - CHUNK_HEADER_LEN;
            (start, chunk.offset + chunk.data.len(), index)
        })
        .collect();
    spans.sort_unstable();

    // widest span seen so far, as (start, end, index)
    let mut outer: Option<(usize, usize, usize)> = None;
    for &(start, end, index) in &spans {
        if let Some((outer_start, outer_end, outer_index)) = outer {
            if start > outer_start && start < outer_end {
                return Err(DxbcError::malformed_offsets(format!(
                    "chunk {index} at offset {start} starts inside chunk {outer_index}"
                )));
            }
        }
        if outer.map_or(true, |(_, outer_end, _)| end > outer_end) {
            outer = Some((start, end, index));
        }
    }
    Ok(())
}

fn read_chunk(bytes: &[u8], at: usize) -> Result<DxbcChunk<'_>, DxbcError> {
    let data_start = at
        .checked_add(CHUNK_HEADER_LEN)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| {
            DxbcError::out_of_bounds(format!(
                "chunk header at {at} runs past total_size {}",
                bytes.len()
            ))
        })?;
    let fourcc = FourCC(read_array::<4>(bytes, at)?);
    let size = read_u32_le(bytes, at + 4)? as usize;
    let data = data_start
        .checked_add(size)
        .and_then(|end| bytes.get(data_start..end))
        .ok_or_else(|| {
            DxbcError::out_of_bounds(format!(
                "{fourcc} payload of {size} bytes at {data_start} runs past total_size {}",
                bytes.len()
            ))
        })?;
    Ok(DxbcChunk {
        fourcc,
        offset: data_start,
        data,
    })
}

fn read_array<const N: usize>(bytes: &[u8], at: usize) -> Result<[u8; N], DxbcError> {
    at.checked_add(N)
        .and_then(|end| bytes.get(at..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            DxbcError::out_of_bounds(format!("{N} bytes at {at} past end {}", bytes.len()))
        })
}

fn read_u32_le(bytes: &[u8], at: usize) -> Result<u32, DxbcError> {
    read_array::<4>(bytes, at).map(u32::from_le_bytes)
}
