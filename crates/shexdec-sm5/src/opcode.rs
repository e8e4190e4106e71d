//! SM4/SM5 opcode table.
//!
//! Codes and names follow the tokenized program format headers
//! (`d3d10tokenizedprogramformat.hpp` / `d3d11tokenizedprogramformat.hpp`),
//! grouped by the D3D revision that introduced them. The slots 0x6B, 0x70,
//! 0xD1, 0xDA and 0xEB close each revision block and are never assigned.

use core::fmt;

use crate::error::DecodeErrorKind;

/// The D3D revision that introduced an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpcodeRevision {
    D3d10_0,
    D3d10_1,
    D3d11_0,
    D3d11_1,
    Wddm1_3,
}

/// How an instruction body following the head token must be framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeClass {
    /// Extension chain followed by generic operands.
    Standard,
    /// `DCL_*`: opcode-specific body, skipped using the head length.
    Declaration,
    /// Separately length-framed payload (see [`crate::CustomDataBlock`]).
    CustomData,
}

macro_rules! opcode_table {
    ($(
        $revision:ident {
            $($class:ident $variant:ident = $code:literal => $name:literal,)*
        }
    )*) => {
        /// Symbolic SM4/SM5 opcode.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum Opcode {
            $($($variant = $code,)*)*
        }

        impl Opcode {
            /// Every assigned opcode, in code order.
            pub const ALL: &'static [Opcode] = &[$($(Opcode::$variant,)*)*];

            pub const fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($($code => Some(Opcode::$variant),)*)*
                    _ => None,
                }
            }

            /// Upper-case name as spelled in the SDK headers without the `D3D10_SB_OPCODE_` prefix.
            pub const fn name(self) -> &'static str {
                match self {
                    $($(Opcode::$variant => $name,)*)*
                }
            }

            pub const fn revision(self) -> OpcodeRevision {
                match self {
                    $($(Opcode::$variant)|* => OpcodeRevision::$revision,)*
                }
            }

            pub const fn class(self) -> OpcodeClass {
                match self {
                    $($(Opcode::$variant => OpcodeClass::$class,)*)*
                }
            }
        }
    };
}

impl Opcode {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub const fn is_declaration(self) -> bool {
        matches!(self.class(), OpcodeClass::Declaration)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up the opcode for a 10-bit code taken from an instruction head token.
pub fn opcode_for(code: u16) -> Result<Opcode, DecodeErrorKind> {
    Opcode::from_code(code).ok_or(DecodeErrorKind::UnknownOpcode { code })
}

opcode_table! {
    D3d10_0 {
        Standard Add = 0x00 => "ADD",
        Standard And = 0x01 => "AND",
        Standard Break = 0x02 => "BREAK",
        Standard BreakC = 0x03 => "BREAK_C",
        Standard Call = 0x04 => "CALL",
        Standard CallC = 0x05 => "CALL_C",
        Standard Case = 0x06 => "CASE",
        Standard Continue = 0x07 => "CONTINUE",
        Standard ContinueC = 0x08 => "CONTINUE_C",
        Standard Cut = 0x09 => "CUT",
        Standard Default = 0x0a => "DEFAULT",
        Standard DerivRtx = 0x0b => "DERIV_RTX",
        Standard DerivRty = 0x0c => "DERIV_RTY",
        Standard Discard = 0x0d => "DISCARD",
        Standard Div = 0x0e => "DIV",
        Standard Dp2 = 0x0f => "DP_2",
        Standard Dp3 = 0x10 => "DP_3",
        Standard Dp4 = 0x11 => "DP_4",
        Standard Else = 0x12 => "ELSE",
        Standard Emit = 0x13 => "EMIT",
        Standard EmitThenCut = 0x14 => "EMIT_THEN_CUT",
        Standard EndIf = 0x15 => "END_IF",
        Standard EndLoop = 0x16 => "END_LOOP",
        Standard EndSwitch = 0x17 => "END_SWITCH",
        Standard Eq = 0x18 => "EQ",
        Standard Exp = 0x19 => "EXP",
        Standard Frc = 0x1a => "FRC",
        Standard FToI = 0x1b => "F_TO_I",
        Standard FToU = 0x1c => "F_TO_U",
        Standard Ge = 0x1d => "GE",
        Standard Iadd = 0x1e => "IADD",
        Standard If = 0x1f => "IF",
        Standard Ieq = 0x20 => "IEQ",
        Standard Ige = 0x21 => "IGE",
        Standard Ilt = 0x22 => "ILT",
        Standard Imad = 0x23 => "IMAD",
        Standard Imax = 0x24 => "IMAX",
        Standard Imin = 0x25 => "IMIN",
        Standard Imul = 0x26 => "IMUL",
        Standard Ine = 0x27 => "INE",
        Standard Ineg = 0x28 => "INEG",
        Standard Ishl = 0x29 => "ISHL",
        Standard Ishr = 0x2a => "ISHR",
        Standard IToF = 0x2b => "I_TO_F",
        Standard Label = 0x2c => "LABEL",
        Standard Ld = 0x2d => "LD",
        Standard LdMs = 0x2e => "LD_MS",
        Standard Log = 0x2f => "LOG",
        Standard Loop = 0x30 => "LOOP",
        Standard Lt = 0x31 => "LT",
        Standard Mad = 0x32 => "MAD",
        Standard Min = 0x33 => "MIN",
        Standard Max = 0x34 => "MAX",
        CustomData CustomData = 0x35 => "CUSTOM_DATA",
        Standard Mov = 0x36 => "MOV",
        Standard MovC = 0x37 => "MOV_C",
        Standard Mul = 0x38 => "MUL",
        Standard Ne = 0x39 => "NE",
        Standard Nop = 0x3a => "NOP",
        Standard Not = 0x3b => "NOT",
        Standard Or = 0x3c => "OR",
        Standard ResInfo = 0x3d => "RES_INFO",
        Standard Ret = 0x3e => "RET",
        Standard RetC = 0x3f => "RET_C",
        Standard RoundNe = 0x40 => "ROUND_NE",
        Standard RoundNi = 0x41 => "ROUND_NI",
        Standard RoundPi = 0x42 => "ROUND_PI",
        Standard RoundZ = 0x43 => "ROUND_Z",
        Standard Rsq = 0x44 => "RSQ",
        Standard Sample = 0x45 => "SAMPLE",
        Standard SampleC = 0x46 => "SAMPLE_C",
        Standard SampleCLz = 0x47 => "SAMPLE_C_LZ",
        Standard SampleL = 0x48 => "SAMPLE_L",
        Standard SampleD = 0x49 => "SAMPLE_D",
        Standard SampleB = 0x4a => "SAMPLE_B",
        Standard Sqrt = 0x4b => "SQRT",
        Standard Switch = 0x4c => "SWITCH",
        Standard SinCos = 0x4d => "SIN_COS",
        Standard Udiv = 0x4e => "UDIV",
        Standard Ult = 0x4f => "ULT",
        Standard Uge = 0x50 => "UGE",
        Standard Umul = 0x51 => "UMUL",
        Standard Umad = 0x52 => "UMAD",
        Standard Umax = 0x53 => "UMAX",
        Standard Umin = 0x54 => "UMIN",
        Standard Ushr = 0x55 => "USHR",
        Standard UToF = 0x56 => "U_TO_F",
        Standard Xor = 0x57 => "XOR",
        Declaration DclResource = 0x58 => "DCL_RESOURCE",
        Declaration DclConstantBuffer = 0x59 => "DCL_CONSTANT_BUFFER",
        Declaration DclSampler = 0x5a => "DCL_SAMPLER",
        Declaration DclIndexRange = 0x5b => "DCL_INDEX_RANGE",
        Declaration DclGsOutputPrimitiveTopology = 0x5c => "DCL_GS_OUTPUT_PRIMITIVE_TOPOLOGY",
        Declaration DclGsInputPrimitive = 0x5d => "DCL_GS_INPUT_PRIMITIVE",
        Declaration DclMaxOutputVertexCount = 0x5e => "DCL_MAX_OUTPUT_VERTEX_COUNT",
        Declaration DclInput = 0x5f => "DCL_INPUT",
        Declaration DclInputSgv = 0x60 => "DCL_INPUT_SGV",
        Declaration DclInputSiv = 0x61 => "DCL_INPUT_SIV",
        Declaration DclInputPs = 0x62 => "DCL_INPUT_PS",
        Declaration DclInputPsSgv = 0x63 => "DCL_INPUT_PS_SGV",
        Declaration DclInputPsSiv = 0x64 => "DCL_INPUT_PS_SIV",
        Declaration DclOutput = 0x65 => "DCL_OUTPUT",
        Declaration DclOutputSgv = 0x66 => "DCL_OUTPUT_SGV",
        Declaration DclOutputSiv = 0x67 => "DCL_OUTPUT_SIV",
        Declaration DclTemps = 0x68 => "DCL_TEMPS",
        Declaration DclIndexableTemp = 0x69 => "DCL_INDEXABLE_TEMP",
        Declaration DclGlobalFlags = 0x6a => "DCL_GLOBAL_FLAGS",
    }
    D3d10_1 {
        Standard Lod = 0x6c => "LOD",
        Standard Gather4 = 0x6d => "GATHER_4",
        Standard SamplePos = 0x6e => "SAMPLE_POS",
        Standard SampleInfo = 0x6f => "SAMPLE_INFO",
    }
    D3d11_0 {
        Standard HsDecls = 0x71 => "HS_DECLS",
        Standard HsControlPointPhase = 0x72 => "HS_CONTROL_POINT_PHASE",
        Standard HsForkPhase = 0x73 => "HS_FORK_PHASE",
        Standard HsJoinPhase = 0x74 => "HS_JOIN_PHASE",
        Standard EmitStream = 0x75 => "EMIT_STREAM",
        Standard CutStream = 0x76 => "CUT_STREAM",
        Standard EmitThenCutStream = 0x77 => "EMIT_THEN_CUT_STREAM",
        Standard InterfaceCall = 0x78 => "INTERFACE_CALL",
        Standard BufInfo = 0x79 => "BUF_INFO",
        Standard DerivRtxCoarse = 0x7a => "DERIV_RTX_COARSE",
        Standard DerivRtxFine = 0x7b => "DERIV_RTX_FINE",
        Standard DerivRtyCoarse = 0x7c => "DERIV_RTY_COARSE",
        Standard DerivRtyFine = 0x7d => "DERIV_RTY_FINE",
        Standard Gather4C = 0x7e => "GATHER_4_C",
        Standard Gather4Po = 0x7f => "GATHER_4_PO",
        Standard Gather4PoC = 0x80 => "GATHER_4_PO_C",
        Standard Rcp = 0x81 => "RCP",
        Standard F32ToF16 = 0x82 => "F32_TO_F16",
        Standard F16ToF32 = 0x83 => "F16_TO_F32",
        Standard Uaddc = 0x84 => "UADDC",
        Standard Usubb = 0x85 => "USUBB",
        Standard Countbits = 0x86 => "COUNTBITS",
        Standard FirstbitHi = 0x87 => "FIRSTBIT_HI",
        Standard FirstbitLo = 0x88 => "FIRSTBIT_LO",
        Standard FirstbitShi = 0x89 => "FIRSTBIT_SHI",
        Standard Ubfe = 0x8a => "UBFE",
        Standard Ibfe = 0x8b => "IBFE",
        Standard Bfi = 0x8c => "BFI",
        Standard Bfrev = 0x8d => "BFREV",
        Standard Swapc = 0x8e => "SWAPC",
        Declaration DclStream = 0x8f => "DCL_STREAM",
        Declaration DclFunctionBody = 0x90 => "DCL_FUNCTION_BODY",
        Declaration DclFunctionTable = 0x91 => "DCL_FUNCTION_TABLE",
        Declaration DclInterface = 0x92 => "DCL_INTERFACE",
        Declaration DclInputControlPointCount = 0x93 => "DCL_INPUT_CONTROL_POINT_COUNT",
        Declaration DclOutputControlPointCount = 0x94 => "DCL_OUTPUT_CONTROL_POINT_COUNT",
        Declaration DclTessDomain = 0x95 => "DCL_TESS_DOMAIN",
        Declaration DclTessPartitioning = 0x96 => "DCL_TESS_PARTITIONING",
        Declaration DclTessOutputPrimitive = 0x97 => "DCL_TESS_OUTPUT_PRIMITIVE",
        Declaration DclHsMaxTessfactor = 0x98 => "DCL_HS_MAX_TESSFACTOR",
        Declaration DclHsForkPhaseInstanceCount = 0x99 => "DCL_HS_FORK_PHASE_INSTANCE_COUNT",
        Declaration DclHsJoinPhaseInstanceCount = 0x9a => "DCL_HS_JOIN_PHASE_INSTANCE_COUNT",
        Declaration DclThreadGroup = 0x9b => "DCL_THREAD_GROUP",
        Declaration DclUnorderedAccessViewTyped = 0x9c => "DCL_UNORDERED_ACCESS_VIEW_TYPED",
        Declaration DclUnorderedAccessViewRaw = 0x9d => "DCL_UNORDERED_ACCESS_VIEW_RAW",
        Declaration DclUnorderedAccessViewStructured = 0x9e => "DCL_UNORDERED_ACCESS_VIEW_STRUCTURED",
        Declaration DclThreadGroupSharedMemoryRaw = 0x9f => "DCL_THREAD_GROUP_SHARED_MEMORY_RAW",
        Declaration DclThreadGroupSharedMemoryStructured = 0xa0 => "DCL_THREAD_GROUP_SHARED_MEMORY_STRUCTURED",
        Declaration DclResourceRaw = 0xa1 => "DCL_RESOURCE_RAW",
        Declaration DclResourceStructured = 0xa2 => "DCL_RESOURCE_STRUCTURED",
        Standard LdUavTyped = 0xa3 => "LD_UAV_TYPED",
        Standard StoreUavTyped = 0xa4 => "STORE_UAV_TYPED",
        Standard LdRaw = 0xa5 => "LD_RAW",
        Standard StoreRaw = 0xa6 => "STORE_RAW",
        Standard LdStructured = 0xa7 => "LD_STRUCTURED",
        Standard StoreStructured = 0xa8 => "STORE_STRUCTURED",
        Standard AtomicAnd = 0xa9 => "ATOMIC_AND",
        Standard AtomicOr = 0xaa => "ATOMIC_OR",
        Standard AtomicXor = 0xab => "ATOMIC_XOR",
        Standard AtomicCmpStore = 0xac => "ATOMIC_CMP_STORE",
        Standard AtomicIadd = 0xad => "ATOMIC_IADD",
        Standard AtomicImax = 0xae => "ATOMIC_IMAX",
        Standard AtomicImin = 0xaf => "ATOMIC_IMIN",
        Standard AtomicUmax = 0xb0 => "ATOMIC_UMAX",
        Standard AtomicUmin = 0xb1 => "ATOMIC_UMIN",
        Standard ImmAtomicAlloc = 0xb2 => "IMM_ATOMIC_ALLOC",
        Standard ImmAtomicConsume = 0xb3 => "IMM_ATOMIC_CONSUME",
        Standard ImmAtomicIadd = 0xb4 => "IMM_ATOMIC_IADD",
        Standard ImmAtomicAnd = 0xb5 => "IMM_ATOMIC_AND",
        Standard ImmAtomicOr = 0xb6 => "IMM_ATOMIC_OR",
        Standard ImmAtomicXor = 0xb7 => "IMM_ATOMIC_XOR",
        Standard ImmAtomicExch = 0xb8 => "IMM_ATOMIC_EXCH",
        Standard ImmAtomicCmpExch = 0xb9 => "IMM_ATOMIC_CMP_EXCH",
        Standard ImmAtomicImax = 0xba => "IMM_ATOMIC_IMAX",
        Standard ImmAtomicImin = 0xbb => "IMM_ATOMIC_IMIN",
        Standard ImmAtomicUmax = 0xbc => "IMM_ATOMIC_UMAX",
        Standard ImmAtomicUmin = 0xbd => "IMM_ATOMIC_UMIN",
        Standard Sync = 0xbe => "SYNC",
        Standard Dadd = 0xbf => "DADD",
        Standard Dmax = 0xc0 => "DMAX",
        Standard Dmin = 0xc1 => "DMIN",
        Standard Dmul = 0xc2 => "DMUL",
        Standard Deq = 0xc3 => "DEQ",
        Standard Dge = 0xc4 => "DGE",
        Standard Dlt = 0xc5 => "DLT",
        Standard Dne = 0xc6 => "DNE",
        Standard Dmov = 0xc7 => "DMOV",
        Standard Dmovc = 0xc8 => "DMOVC",
        Standard Dtof = 0xc9 => "DTOF",
        Standard Ftod = 0xca => "FTOD",
        Standard EvalSnapped = 0xcb => "EVAL_SNAPPED",
        Standard EvalSampleIndex = 0xcc => "EVAL_SAMPLE_INDEX",
        Standard EvalCentroid = 0xcd => "EVAL_CENTROID",
        Declaration DclGsInstanceCount = 0xce => "DCL_GS_INSTANCE_COUNT",
        Standard Abort = 0xcf => "ABORT",
        Standard DebugBreak = 0xd0 => "DEBUG_BREAK",
    }
    D3d11_1 {
        Standard Ddiv = 0xd2 => "DDIV",
        Standard Dfma = 0xd3 => "DFMA",
        Standard Drcp = 0xd4 => "DRCP",
        Standard Msad = 0xd5 => "MSAD",
        Standard DToI = 0xd6 => "D_TO_I",
        Standard DToU = 0xd7 => "D_TO_U",
        Standard IToD = 0xd8 => "I_TO_D",
        Standard UToD = 0xd9 => "U_TO_D",
    }
    Wddm1_3 {
        Standard Gather4Feedback = 0xdb => "GATHER_4_FEEDBACK",
        Standard Gather4CFeedback = 0xdc => "GATHER_4_C_FEEDBACK",
        Standard Gather4PoFeedback = 0xdd => "GATHER_4_PO_FEEDBACK",
        Standard Gather4PoCFeedback = 0xde => "GATHER_4_PO_C_FEEDBACK",
        Standard LdFeedback = 0xdf => "LD_FEEDBACK",
        Standard LdMsFeedback = 0xe0 => "LD_MS_FEEDBACK",
        Standard LdUavTypedFeedback = 0xe1 => "LD_UAV_TYPED_FEEDBACK",
        Standard LdRawFeedback = 0xe2 => "LD_RAW_FEEDBACK",
        Standard LdStructuredFeedback = 0xe3 => "LD_STRUCTURED_FEEDBACK",
        Standard SampleLFeedback = 0xe4 => "SAMPLE_L_FEEDBACK",
        Standard SampleCLzFeedback = 0xe5 => "SAMPLE_C_LZ_FEEDBACK",
        Standard SampleClampFeedback = 0xe6 => "SAMPLE_CLAMP_FEEDBACK",
        Standard SampleBClampFeedback = 0xe7 => "SAMPLE_B_CLAMP_FEEDBACK",
        Standard SampleDClampFeedback = 0xe8 => "SAMPLE_D_CLAMP_FEEDBACK",
        Standard SampleCClampFeedback = 0xe9 => "SAMPLE_C_CLAMP_FEEDBACK",
        Standard CheckAccessFullyMapped = 0xea => "CHECK_ACCESS_FULLY_MAPPED",
    }
}
