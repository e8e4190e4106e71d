//! Generic operand decoding.
//!
//! An operand is one descriptor token followed by its index tokens (and, for
//! immediates, the literal values). Index representations that are relative
//! embed a whole nested operand, which is only allowed one level deep.

use bitflags::bitflags;

use crate::error::{DecodeError, DecodeErrorKind};
use crate::reader::TokenReader;

const OPERAND_NUM_COMPONENTS_MASK: u32 = 0x3;
const OPERAND_SELECTION_MODE_SHIFT: u32 = 2;
const OPERAND_SELECTION_MODE_MASK: u32 = 0x3;
const OPERAND_COMPONENT_SELECTION_SHIFT: u32 = 4;
const OPERAND_SELECTION_BITS_SHIFT: u32 = 2;
const OPERAND_SELECTION_BITS_MASK: u32 = 0x3ff;
const OPERAND_TYPE_SHIFT: u32 = 12;
const OPERAND_TYPE_MASK: u32 = 0xff;
const OPERAND_INDEX_DIMENSION_SHIFT: u32 = 20;
const OPERAND_INDEX_DIMENSION_MASK: u32 = 0x3;
const OPERAND_INDEX0_REP_SHIFT: u32 = 22;
const OPERAND_INDEX_REP_STRIDE: u32 = 3;
const OPERAND_INDEX_REP_MASK: u32 = 0x7;
const OPERAND_EXTENDED_BIT: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentCount {
    Zero,
    One,
    Four,
}

impl ComponentCount {
    pub fn count(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::Four => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    Mask,
    Swizzle,
    Select1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    X,
    Y,
    Z,
    W,
}

impl Component {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x3 {
            0 => Self::X,
            1 => Self::Y,
            2 => Self::Z,
            _ => Self::W,
        }
    }
}

bitflags! {
    /// Write mask of a four-component operand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ComponentMask: u8 {
        const X = 0b0001;
        const Y = 0b0010;
        const Z = 0b0100;
        const W = 0b1000;
    }
}

/// Component selector of an operand; matches its [`SelectionMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSelection {
    /// Zero- and one-component operands carry no selector.
    None,
    Mask(ComponentMask),
    Swizzle([Component; 4]),
    Select1(Component),
}

macro_rules! operand_types {
    ($($variant:ident = $value:literal,)*) => {
        /// Register file or resource kind (`D3D10_SB_OPERAND_TYPE`).
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum OperandType {
            $($variant = $value,)*
        }

        impl OperandType {
            pub fn from_raw(ty: u32) -> Result<Self, DecodeErrorKind> {
                match ty {
                    $($value => Ok(Self::$variant),)*
                    ty => Err(DecodeErrorKind::InvalidOperandType { ty }),
                }
            }
        }
    };
}

operand_types! {
    Temp = 0,
    Input = 1,
    Output = 2,
    IndexableTemp = 3,
    Immediate32 = 4,
    Immediate64 = 5,
    Sampler = 6,
    Resource = 7,
    ConstantBuffer = 8,
    ImmediateConstantBuffer = 9,
    Label = 10,
    InputPrimitiveId = 11,
    OutputDepth = 12,
    Null = 13,
    Rasterizer = 14,
    OutputCoverageMask = 15,
    Stream = 16,
    FunctionBody = 17,
    FunctionTable = 18,
    Interface = 19,
    FunctionInput = 20,
    FunctionOutput = 21,
    OutputControlPointId = 22,
    InputForkInstanceId = 23,
    InputJoinInstanceId = 24,
    InputControlPoint = 25,
    OutputControlPoint = 26,
    InputPatchConstant = 27,
    InputDomainPoint = 28,
    ThisPointer = 29,
    UnorderedAccessView = 30,
    ThreadGroupSharedMemory = 31,
    InputThreadId = 32,
    InputThreadGroupId = 33,
    InputThreadIdInGroup = 34,
    InputCoverageMask = 35,
    InputThreadIdInGroupFlattened = 36,
    InputGsInstanceId = 37,
    OutputDepthGreaterEqual = 38,
    OutputDepthLessEqual = 39,
    CycleCounter = 40,
    OutputStencilRef = 41,
    InnerCoverage = 42,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexRepresentation {
    Immediate32,
    Immediate64,
    Relative,
    Immediate32PlusRelative,
    Immediate64PlusRelative,
}

impl IndexRepresentation {
    pub fn from_raw(rep: u32) -> Result<Self, DecodeErrorKind> {
        Ok(match rep {
            0 => Self::Immediate32,
            1 => Self::Immediate64,
            2 => Self::Relative,
            3 => Self::Immediate32PlusRelative,
            4 => Self::Immediate64PlusRelative,
            rep => return Err(DecodeErrorKind::InvalidIndexRepresentation { rep }),
        })
    }

    pub fn is_relative(self) -> bool {
        matches!(
            self,
            Self::Relative | Self::Immediate32PlusRelative | Self::Immediate64PlusRelative
        )
    }
}

/// One decoded index of an operand, e.g. the `3` and `r1.x` in `cb0[r1.x + 3]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandIndex {
    Immediate32(u32),
    Immediate64(u64),
    Relative(Box<Operand>),
    Immediate32PlusRelative(u32, Box<Operand>),
    Immediate64PlusRelative(u64, Box<Operand>),
}

impl OperandIndex {
    pub fn representation(&self) -> IndexRepresentation {
        match self {
            Self::Immediate32(_) => IndexRepresentation::Immediate32,
            Self::Immediate64(_) => IndexRepresentation::Immediate64,
            Self::Relative(_) => IndexRepresentation::Relative,
            Self::Immediate32PlusRelative(..) => IndexRepresentation::Immediate32PlusRelative,
            Self::Immediate64PlusRelative(..) => IndexRepresentation::Immediate64PlusRelative,
        }
    }

    /// Tokens this index occupies after the descriptor.
    pub fn token_len(&self) -> usize {
        match self {
            Self::Immediate32(_) => 1,
            Self::Immediate64(_) => 2,
            Self::Relative(rel) => rel.token_len(),
            Self::Immediate32PlusRelative(_, rel) => 1 + rel.token_len(),
            Self::Immediate64PlusRelative(_, rel) => 2 + rel.token_len(),
        }
    }

    pub fn relative(&self) -> Option<&Operand> {
        match self {
            Self::Immediate32(_) | Self::Immediate64(_) => None,
            Self::Relative(rel)
            | Self::Immediate32PlusRelative(_, rel)
            | Self::Immediate64PlusRelative(_, rel) => Some(rel),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operand {
    /// Raw descriptor token.
    pub descriptor: u32,
    pub ty: OperandType,
    pub components: ComponentCount,
    pub selection: ComponentSelection,
    pub indices: Vec<OperandIndex>,
    /// Literal tokens of `Immediate32`/`Immediate64` operands.
    pub immediate: Vec<u32>,
}

impl Operand {
    /// Decodes one operand, consuming exactly [`Operand::token_len`] tokens on success.
    pub fn decode(reader: &mut TokenReader<'_>, strict: bool) -> Result<Self, DecodeError> {
        decode_operand(reader, strict, false)
    }

    pub fn token_len(&self) -> usize {
        1 + self.indices.iter().map(OperandIndex::token_len).sum::<usize>() + self.immediate.len()
    }

    pub fn index_dimension(&self) -> usize {
        self.indices.len()
    }

    pub fn selection_mode(&self) -> Option<SelectionMode> {
        match self.selection {
            ComponentSelection::None => None,
            ComponentSelection::Mask(_) => Some(SelectionMode::Mask),
            ComponentSelection::Swizzle(_) => Some(SelectionMode::Swizzle),
            ComponentSelection::Select1(_) => Some(SelectionMode::Select1),
        }
    }

    pub fn mask(&self) -> Option<ComponentMask> {
        match self.selection {
            ComponentSelection::Mask(mask) => Some(mask),
            _ => None,
        }
    }

    pub fn swizzle(&self) -> Option<[Component; 4]> {
        match self.selection {
            ComponentSelection::Swizzle(swizzle) => Some(swizzle),
            _ => None,
        }
    }

    pub fn select1(&self) -> Option<Component> {
        match self.selection {
            ComponentSelection::Select1(c) => Some(c),
            _ => None,
        }
    }
}

fn decode_operand(
    reader: &mut TokenReader<'_>,
    strict: bool,
    nested: bool,
) -> Result<Operand, DecodeError> {
    let at = reader.token_position();
    let token = reader.read_token()?;
    let err = |kind| DecodeError::new(at, kind);

    let components = match token & OPERAND_NUM_COMPONENTS_MASK {
        0 => ComponentCount::Zero,
        1 => ComponentCount::One,
        2 => ComponentCount::Four,
        _ => return Err(err(DecodeErrorKind::ReservedComponentCount)),
    };

    let selection = match components {
        ComponentCount::Four => {
            let mode = (token >> OPERAND_SELECTION_MODE_SHIFT) & OPERAND_SELECTION_MODE_MASK;
            let sel = token >> OPERAND_COMPONENT_SELECTION_SHIFT;
            match mode {
                0 => ComponentSelection::Mask(ComponentMask::from_bits_truncate((sel & 0xf) as u8)),
                1 => ComponentSelection::Swizzle([
                    Component::from_bits(sel),
                    Component::from_bits(sel >> 2),
                    Component::from_bits(sel >> 4),
                    Component::from_bits(sel >> 6),
                ]),
                2 => ComponentSelection::Select1(Component::from_bits(sel)),
                mode => return Err(err(DecodeErrorKind::InvalidSelectionMode { mode })),
            }
        }
        ComponentCount::Zero | ComponentCount::One => {
            let bits = (token >> OPERAND_SELECTION_BITS_SHIFT) & OPERAND_SELECTION_BITS_MASK;
            if strict && bits != 0 {
                return Err(err(DecodeErrorKind::NonZeroSelectionBits { bits }));
            }
            ComponentSelection::None
        }
    };

    let ty = OperandType::from_raw((token >> OPERAND_TYPE_SHIFT) & OPERAND_TYPE_MASK).map_err(err)?;

    let dim = match (token >> OPERAND_INDEX_DIMENSION_SHIFT) & OPERAND_INDEX_DIMENSION_MASK {
        dim @ 0..=2 => dim as usize,
        dim => return Err(err(DecodeErrorKind::InvalidIndexDimension { dim })),
    };
    let mut reps = Vec::with_capacity(dim);
    for i in 0..dim as u32 {
        let shift = OPERAND_INDEX0_REP_SHIFT + OPERAND_INDEX_REP_STRIDE * i;
        let rep = IndexRepresentation::from_raw((token >> shift) & OPERAND_INDEX_REP_MASK)
            .map_err(err)?;
        if nested && rep.is_relative() {
            return Err(err(DecodeErrorKind::NestedRelativeIndex));
        }
        reps.push(rep);
    }

    if token & OPERAND_EXTENDED_BIT != 0 {
        return Err(err(DecodeErrorKind::ExtendedOperandUnsupported));
    }

    let mut indices = Vec::with_capacity(dim);
    for rep in reps {
        let index = match rep {
            IndexRepresentation::Immediate32 => OperandIndex::Immediate32(reader.read_token()?),
            IndexRepresentation::Immediate64 => OperandIndex::Immediate64(read_u64(reader)?),
            IndexRepresentation::Relative => {
                OperandIndex::Relative(Box::new(decode_operand(reader, strict, true)?))
            }
            IndexRepresentation::Immediate32PlusRelative => {
                let imm = reader.read_token()?;
                let rel = decode_operand(reader, strict, true)?;
                OperandIndex::Immediate32PlusRelative(imm, Box::new(rel))
            }
            IndexRepresentation::Immediate64PlusRelative => {
                let imm = read_u64(reader)?;
                let rel = decode_operand(reader, strict, true)?;
                OperandIndex::Immediate64PlusRelative(imm, Box::new(rel))
            }
        };
        indices.push(index);
    }

    let immediate_len = match ty {
        OperandType::Immediate32 => components.count(),
        OperandType::Immediate64 => 2 * components.count(),
        _ => 0,
    };
    let immediate = reader.read_tokens(immediate_len)?;

    Ok(Operand {
        descriptor: token,
        ty,
        components,
        selection,
        indices,
        immediate,
    })
}

/// 64-bit immediates are stored high dword first.
fn read_u64(reader: &mut TokenReader<'_>) -> Result<u64, DecodeError> {
    let hi = reader.read_token()?;
    let lo = reader.read_token()?;
    Ok(u64::from(hi) << 32 | u64::from(lo))
}
