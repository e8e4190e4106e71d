//! Extended opcode tokens.
//!
//! Any instruction head (or extension) token with bit 31 set is followed by one
//! more extension token. Every extension shares the same framing: type in
//! `[5:0]`, a 25-bit payload in `[30:6]`, and the chaining bit in `[31]`.

use crate::error::{DecodeError, DecodeErrorKind};
use crate::reader::TokenReader;

const TYPE_MASK: u32 = 0x0000_003f;
const PAYLOAD_SHIFT: u32 = 6;
const PAYLOAD_MASK: u32 = 0x7fff_ffc0;
const EXTENDED_BIT: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionType {
    Empty = 0,
    SampleControls = 1,
    ResourceDimension = 2,
    ResourceReturnType = 3,
}

impl ExtensionType {
    pub fn from_raw(ty: u32) -> Result<Self, DecodeErrorKind> {
        Ok(match ty {
            0 => Self::Empty,
            1 => Self::SampleControls,
            2 => Self::ResourceDimension,
            3 => Self::ResourceReturnType,
            ty => return Err(DecodeErrorKind::InvalidExtensionType { ty }),
        })
    }
}

/// Immediate texel offsets applied by sample/ld instructions (`sample_aoffimmi`).
///
/// Each offset is a 4-bit two's complement value in `-8..=7`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SampleControls {
    pub u: i8,
    pub v: i8,
    pub w: i8,
}

impl SampleControls {
    const RESERVED_LOW: u32 = 0x0000_01c0; // [8:6]
    const RESERVED_HIGH: u32 = 0x7fe0_0000; // [30:21]

    fn decode(token: u32) -> Result<Self, DecodeErrorKind> {
        let reserved = token & (Self::RESERVED_LOW | Self::RESERVED_HIGH);
        if reserved != 0 {
            return Err(DecodeErrorKind::ReservedBitsSet {
                field: "sample controls",
                bits: reserved,
            });
        }
        Ok(Self {
            u: sign_extend_4((token >> 9) & 0xf),
            v: sign_extend_4((token >> 13) & 0xf),
            w: sign_extend_4((token >> 17) & 0xf),
        })
    }

    fn encode(self) -> u32 {
        let nibble = |v: i8| (v as u8 as u32) & 0xf;
        nibble(self.u) << 9 | nibble(self.v) << 13 | nibble(self.w) << 17
    }
}

fn sign_extend_4(bits: u32) -> i8 {
    ((bits as u8) << 4) as i8 >> 4
}

/// `D3D10_SB_RESOURCE_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Unknown = 0,
    Buffer = 1,
    Texture1D = 2,
    Texture2D = 3,
    Texture2DMs = 4,
    Texture3D = 5,
    TextureCube = 6,
    Texture1DArray = 7,
    Texture2DArray = 8,
    Texture2DMsArray = 9,
    TextureCubeArray = 10,
    RawBuffer = 11,
    StructuredBuffer = 12,
}

impl ResourceDimension {
    pub fn from_raw(value: u32) -> Result<Self, DecodeErrorKind> {
        Ok(match value {
            0 => Self::Unknown,
            1 => Self::Buffer,
            2 => Self::Texture1D,
            3 => Self::Texture2D,
            4 => Self::Texture2DMs,
            5 => Self::Texture3D,
            6 => Self::TextureCube,
            7 => Self::Texture1DArray,
            8 => Self::Texture2DArray,
            9 => Self::Texture2DMsArray,
            10 => Self::TextureCubeArray,
            11 => Self::RawBuffer,
            12 => Self::StructuredBuffer,
            value => return Err(DecodeErrorKind::InvalidResourceDimension { value }),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionControls {
    pub dimension: ResourceDimension,
    /// Structure stride in bytes; only meaningful for structured buffers.
    pub stride: u16,
}

impl DimensionControls {
    const RESERVED: u32 = 0x7f80_0000; // [30:23]

    fn decode(token: u32) -> Result<Self, DecodeErrorKind> {
        let reserved = token & Self::RESERVED;
        if reserved != 0 {
            return Err(DecodeErrorKind::ReservedBitsSet {
                field: "resource dimension",
                bits: reserved,
            });
        }
        Ok(Self {
            dimension: ResourceDimension::from_raw((token >> 6) & 0x1f)?,
            stride: ((token >> 11) & 0xfff) as u16,
        })
    }

    fn encode(self) -> u32 {
        (self.dimension as u32) << 6 | (u32::from(self.stride) & 0xfff) << 11
    }
}

/// `D3D10_SB_RESOURCE_RETURN_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    UNorm = 1,
    SNorm = 2,
    SInt = 3,
    UInt = 4,
    Float = 5,
    Mixed = 6,
    Double = 7,
    Continued = 8,
    Unused = 9,
}

impl ReturnType {
    pub fn from_raw(value: u32) -> Result<Self, DecodeErrorKind> {
        Ok(match value {
            1 => Self::UNorm,
            2 => Self::SNorm,
            3 => Self::SInt,
            4 => Self::UInt,
            5 => Self::Float,
            6 => Self::Mixed,
            7 => Self::Double,
            8 => Self::Continued,
            9 => Self::Unused,
            value => return Err(DecodeErrorKind::InvalidReturnType { value }),
        })
    }
}

/// Per-component resource return types, in `x, y, z, w` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnControls(pub [ReturnType; 4]);

impl ReturnControls {
    const RESERVED: u32 = 0x7fc0_0000; // [30:22]

    fn decode(token: u32) -> Result<Self, DecodeErrorKind> {
        let reserved = token & Self::RESERVED;
        if reserved != 0 {
            return Err(DecodeErrorKind::ReservedBitsSet {
                field: "resource return type",
                bits: reserved,
            });
        }
        let lane = |i: u32| ReturnType::from_raw((token >> (6 + 4 * i)) & 0xf);
        Ok(Self([lane(0)?, lane(1)?, lane(2)?, lane(3)?]))
    }

    fn encode(self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |acc, (i, ty)| acc | (*ty as u32) << (6 + 4 * i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionControls {
    /// Type 0. The payload bits carry no defined meaning here and are kept as-is
    /// (`[30:6]`, shifted down) so the token re-encodes unchanged.
    Empty { payload: u32 },
    Sample(SampleControls),
    Dimension(DimensionControls),
    Return(ReturnControls),
}

/// One decoded extended opcode token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extension {
    pub controls: ExtensionControls,
    /// Another extension token follows this one.
    pub is_extended: bool,
}

impl Extension {
    pub fn kind(&self) -> ExtensionType {
        match self.controls {
            ExtensionControls::Empty { .. } => ExtensionType::Empty,
            ExtensionControls::Sample(_) => ExtensionType::SampleControls,
            ExtensionControls::Dimension(_) => ExtensionType::ResourceDimension,
            ExtensionControls::Return(_) => ExtensionType::ResourceReturnType,
        }
    }

    pub fn from_token(token: u32) -> Result<Self, DecodeErrorKind> {
        let controls = match ExtensionType::from_raw(token & TYPE_MASK)? {
            ExtensionType::Empty => ExtensionControls::Empty {
                payload: (token & PAYLOAD_MASK) >> PAYLOAD_SHIFT,
            },
            ExtensionType::SampleControls => {
                ExtensionControls::Sample(SampleControls::decode(token)?)
            }
            ExtensionType::ResourceDimension => {
                ExtensionControls::Dimension(DimensionControls::decode(token)?)
            }
            ExtensionType::ResourceReturnType => {
                ExtensionControls::Return(ReturnControls::decode(token)?)
            }
        };
        Ok(Self {
            controls,
            is_extended: token & EXTENDED_BIT != 0,
        })
    }

    pub fn to_token(&self) -> u32 {
        let payload = match self.controls {
            ExtensionControls::Empty { payload } => (payload << PAYLOAD_SHIFT) & PAYLOAD_MASK,
            ExtensionControls::Sample(c) => c.encode(),
            ExtensionControls::Dimension(c) => c.encode(),
            ExtensionControls::Return(c) => c.encode(),
        };
        debug_assert_eq!(payload & !PAYLOAD_MASK, 0);
        let extended = if self.is_extended { EXTENDED_BIT } else { 0 };
        self.kind() as u32 | payload | extended
    }
}

/// Decodes the extension chain that follows a head token whose extended bit is `extended`.
///
/// Returns the extensions and the number of tokens consumed.
pub fn decode_chain(
    reader: &mut TokenReader<'_>,
    mut extended: bool,
) -> Result<(Vec<Extension>, usize), DecodeError> {
    let mut extensions = Vec::new();
    while extended {
        let at = reader.token_position();
        let token = reader.read_token()?;
        let extension = Extension::from_token(token).map_err(|kind| DecodeError::new(at, kind))?;
        extended = extension.is_extended;
        extensions.push(extension);
    }
    let consumed = extensions.len();
    Ok((extensions, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_bytes(tokens: &[u32]) -> Vec<u8> {
        tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
    }

    #[test]
    fn sample_offsets_are_sign_extended() {
        // u = -1 (0xf), v = 7, w = -8 (0x8)
        let token = 1 | 0xf << 9 | 0x7 << 13 | 0x8 << 17;
        let ext = Extension::from_token(token).unwrap();
        assert_eq!(
            ext.controls,
            ExtensionControls::Sample(SampleControls { u: -1, v: 7, w: -8 })
        );
        assert!(!ext.is_extended);
        assert_eq!(ext.to_token(), token);
    }

    #[test]
    fn sample_reserved_bits_rejected() {
        let err = Extension::from_token(1 | 1 << 6).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::ReservedBitsSet { bits: 0x40, .. }));
        let err = Extension::from_token(1 | 1 << 21).unwrap_err();
        assert!(matches!(err, DecodeErrorKind::ReservedBitsSet { .. }));
    }

    #[test]
    fn dimension_with_stride() {
        let token = 2 | 12 << 6 | 0x10 << 11 | EXTENDED_BIT;
        let ext = Extension::from_token(token).unwrap();
        assert_eq!(
            ext.controls,
            ExtensionControls::Dimension(DimensionControls {
                dimension: ResourceDimension::StructuredBuffer,
                stride: 0x10,
            })
        );
        assert!(ext.is_extended);
        assert_eq!(ext.kind(), ExtensionType::ResourceDimension);
        assert_eq!(ext.to_token(), token);
    }

    #[test]
    fn dimension_out_of_range() {
        assert_eq!(
            Extension::from_token(2 | 13 << 6),
            Err(DecodeErrorKind::InvalidResourceDimension { value: 13 })
        );
    }

    #[test]
    fn return_types_per_lane() {
        let token = 3 | 5 << 6 | 5 << 10 | 4 << 14 | 9 << 18;
        let ext = Extension::from_token(token).unwrap();
        assert_eq!(
            ext.controls,
            ExtensionControls::Return(ReturnControls([
                ReturnType::Float,
                ReturnType::Float,
                ReturnType::UInt,
                ReturnType::Unused,
            ]))
        );
        assert_eq!(ext.to_token(), token);

        // lane value 0 is not a return type
        assert_eq!(
            Extension::from_token(3 | 5 << 6 | 5 << 10 | 5 << 14),
            Err(DecodeErrorKind::InvalidReturnType { value: 0 })
        );
    }

    #[test]
    fn empty_extension_keeps_payload_bits() {
        // type 0 with bit 13 set, as emitted alongside some arithmetic instructions
        let token = 1 << 13;
        let ext = Extension::from_token(token).unwrap();
        assert_eq!(ext.kind(), ExtensionType::Empty);
        assert_eq!(ext.controls, ExtensionControls::Empty { payload: 1 << 7 });
        assert_eq!(ext.to_token(), token);

        let token = PAYLOAD_MASK | EXTENDED_BIT;
        assert_eq!(Extension::from_token(token).unwrap().to_token(), token);
    }

    #[test]
    fn unknown_type() {
        assert_eq!(
            Extension::from_token(4),
            Err(DecodeErrorKind::InvalidExtensionType { ty: 4 })
        );
        assert_eq!(
            Extension::from_token(0x3f),
            Err(DecodeErrorKind::InvalidExtensionType { ty: 0x3f })
        );
    }

    #[test]
    fn chain_stops_at_clear_extended_bit() {
        let bytes = le_bytes(&[EXTENDED_BIT, 1, 0xdead_beef]);
        let mut r = TokenReader::new(&bytes);
        let (exts, consumed) = decode_chain(&mut r, true).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(exts[0].controls, ExtensionControls::Empty { payload: 0 });
        assert!(exts[0].is_extended);
        assert_eq!(exts[1].kind(), ExtensionType::SampleControls);
        assert_eq!(r.read_token().unwrap(), 0xdead_beef);
    }

    #[test]
    fn chain_not_entered_without_head_bit() {
        let bytes = le_bytes(&[EXTENDED_BIT]);
        let mut r = TokenReader::new(&bytes);
        let (exts, consumed) = decode_chain(&mut r, false).unwrap();
        assert!(exts.is_empty());
        assert_eq!(consumed, 0);
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn chain_truncated_and_error_position() {
        let bytes = le_bytes(&[EXTENDED_BIT]);
        let mut r = TokenReader::new(&bytes);
        assert!(decode_chain(&mut r, true).unwrap_err().is_truncation());

        let bytes = le_bytes(&[EXTENDED_BIT, 7]);
        let mut r = TokenReader::new(&bytes);
        let err = decode_chain(&mut r, true).unwrap_err();
        assert_eq!(err.at_token, 1);
        assert_eq!(err.kind, DecodeErrorKind::InvalidExtensionType { ty: 7 });
    }
}
