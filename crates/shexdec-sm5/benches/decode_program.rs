use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use shexdec_sm5::{decode_program, DecodeOptions, ProgramDecoder};

fn criterion_config() -> Criterion {
    match std::env::var("SHEXDEC_BENCH_PROFILE").as_deref() {
        Ok("ci") => Criterion::default()
            // Keep PR runtime low.
            .warm_up_time(Duration::from_millis(200))
            .measurement_time(Duration::from_secs(1))
            .sample_size(10)
            .noise_threshold(0.05),
        _ => Criterion::default()
            .warm_up_time(Duration::from_secs(1))
            .measurement_time(Duration::from_secs(2))
            .sample_size(30)
            .noise_threshold(0.03),
    }
}

/// A long ps_5_0 body: declarations, then `mul`/`mov`/`sample` repeated, with comments interleaved.
fn synthetic_program(repeats: usize) -> Vec<u8> {
    let mut body: Vec<u32> = vec![
        0x0100_086a,
        0x0400_0059, 0x0020_8e46, 0, 16,
        0x0300_005a, 0x0010_6000, 0,
        0x0400_1858, 0x0010_7000, 0, 0x5555,
        0x0200_0068, 4,
    ];
    for i in 0..repeats as u32 {
        body.extend([
            0x8b00_0045, 0x8000_00c2, 0x0015_5543,
            0x0010_00f2, 0, 0x0010_1046, 1, 0x0010_7e46, 0, 0x0010_6000, 0,
        ]);
        body.extend([0x0800_0038, 0x0010_00f2, 1, 0x0010_0e46, 0, 0x0020_8e46, 0, i % 16]);
        body.extend([0x0500_0036, 0x0010_0082, 2, 0x0000_4001, 0x3f80_0000]);
        if i % 8 == 0 {
            body.extend([0x0000_0035, 4, i, !i]);
        }
    }
    body.push(0x0100_003e);

    let mut tokens = vec![0x0000_0050, body.len() as u32 + 2];
    tokens.extend(body);
    tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_program");
    for repeats in [16usize, 256, 4096] {
        let bytes = synthetic_program(repeats);
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_function(format!("strict/{repeats}"), |b| {
            b.iter(|| decode_program(black_box(&bytes)).unwrap())
        });
        let lenient = ProgramDecoder::new(DecodeOptions::default().with_raw_operand_fallback(true));
        group.bench_function(format!("fallback/{repeats}"), |b| {
            b.iter(|| lenient.decode(black_box(&bytes)).unwrap())
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_decode
}
criterion_main!(benches);
