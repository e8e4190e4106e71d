#![allow(dead_code)]

pub fn le_bytes(tokens: &[u32]) -> Vec<u8> {
    tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
}

pub fn opcode_token(opcode: u32, len: u32) -> u32 {
    opcode | (len << 24)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

pub const PS_5_0: u32 = 0x0000_0050;

/// A ps_5_0 program in the shape fxc emits:
///
/// ```text
/// dcl_globalFlags refactoringAllowed
/// dcl_constantbuffer cb0[1], immediateIndexed
/// dcl_sampler s0, mode_default
/// dcl_resource_texture2d (float,float,float,float) t0
/// dcl_input_ps linear v1.xy
/// dcl_output o0.xyzw
/// dcl_temps 1
/// customdata comment "ab"
/// sample_indexable(texture2d)(float,float,float,float) r0.xyzw, v1.xyxx, t0.xyzw, s0
/// mul r0.xyzw, r0.xyzw, cb0[0].xyzw
/// mov r0.w, l(1.0)
/// mov o0.xyzw, r0.xyzw
/// ret
/// ```
pub fn pixel_shader_tokens() -> Vec<u32> {
    let body: Vec<u32> = vec![
        // dcl_globalFlags
        0x0100_086a,
        // dcl_constantbuffer
        0x0400_0059, 0x0020_8e46, 0, 1,
        // dcl_sampler
        0x0300_005a, 0x0010_6000, 0,
        // dcl_resource_texture2d
        0x0400_1858, 0x0010_7000, 0, 0x5555,
        // dcl_input_ps linear
        0x0300_1062, 0x0010_1032, 1,
        // dcl_output
        0x0300_0065, 0x0010_20f2, 0,
        // dcl_temps
        0x0200_0068, 1,
        // customdata comment
        0x0000_0035, 4, 0x61, 0x62,
        // sample_indexable: dimension + return type extensions
        0x8b00_0045, 0x8000_00c2, 0x0015_5543,
        0x0010_00f2, 0,
        0x0010_1046, 1,
        0x0010_7e46, 0,
        0x0010_6000, 0,
        // mul
        0x0800_0038, 0x0010_00f2, 0, 0x0010_0e46, 0, 0x0020_8e46, 0, 0,
        // mov r0.w, l(1.0)
        0x0500_0036, 0x0010_0082, 0, 0x0000_4001, 0x3f80_0000,
        // mov
        0x0500_0036, 0x0010_20f2, 0, 0x0010_0e46, 0,
        // ret
        0x0100_003e,
    ];
    let mut tokens = vec![PS_5_0, (body.len() + 2) as u32];
    tokens.extend(body);
    tokens
}
