//! Performance benchmarks for the bit writer and reader
//!
//! This benchmark suite evaluates:
//! - Raw fixed-width field throughput
//! - Each varint family on market-data shaped inputs
//! - Decoding throughput for the same streams

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use tickpack_core::{BitReader, BitWriter, VecSink};

/// Number of values encoded per iteration
const VALUES: usize = 100_000;

/// Generate test value patterns for benchmarking
mod test_data {
    /// Simple PRNG for reproducible data
    fn lcg(seed: &mut u64) -> u64 {
        *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        *seed >> 16
    }

    /// Prices on a 0.5 tick grid around 100.000, scaled by 1000
    pub fn prices(n: usize) -> Vec<u64> {
        let mut seed = 0x1234_5678_9ABC_DEF0;
        let mut price = 100_000i64;
        (0..n)
            .map(|_| {
                price += (lcg(&mut seed) % 5) as i64 * 500 - 1_000;
                price = price.max(500);
                price as u64
            })
            .collect()
    }

    /// Round-lot sizes, mostly multiples of 100
    pub fn sizes(n: usize) -> Vec<u64> {
        let mut seed = 0x0FED_CBA9_8765_4321;
        (0..n).map(|_| (lcg(&mut seed) % 50 + 1) * 100).collect()
    }

    /// Small signed deltas centered on zero, a third of them exactly zero
    pub fn deltas(n: usize) -> Vec<i64> {
        let mut seed = 0xDEAD_BEEF_0BAD_F00D;
        (0..n)
            .map(|_| match lcg(&mut seed) % 3 {
                0 => 0,
                _ => (lcg(&mut seed) % 129) as i64 - 64,
            })
            .collect()
    }
}

fn bench_put_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_raw");

    for width in [1u32, 7, 13, 32, 64] {
        group.throughput(Throughput::Elements(VALUES as u64));
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| {
                let mut out = VecSink::with_capacity(VALUES * 8);
                let mut writer = BitWriter::new(&mut out);
                for i in 0..VALUES as u64 {
                    writer.put(black_box(i), width).unwrap();
                }
                writer.finish().unwrap();
                black_box(writer.bits_written());
            });
        });
    }

    group.finish();
}

fn bench_put_varint_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_varint_families");
    let prices = test_data::prices(VALUES);
    let sizes = test_data::sizes(VALUES);
    let deltas = test_data::deltas(VALUES);

    group.throughput(Throughput::Elements(VALUES as u64));
    group.bench_function("var", |b| {
        b.iter(|| {
            let mut out = VecSink::with_capacity(VALUES * 4);
            let mut writer = BitWriter::new(&mut out);
            for &v in &prices {
                writer.put_var(black_box(v)).unwrap();
            }
            writer.finish().unwrap();
        });
    });

    group.bench_function("var_dec_zeros", |b| {
        b.iter(|| {
            let mut out = VecSink::with_capacity(VALUES * 4);
            let mut writer = BitWriter::new(&mut out);
            for &v in &sizes {
                writer.put_var_dec_zeros(black_box(v)).unwrap();
            }
            writer.finish().unwrap();
        });
    });

    group.bench_function("var_sign_zero", |b| {
        b.iter(|| {
            let mut out = VecSink::with_capacity(VALUES * 4);
            let mut writer = BitWriter::new(&mut out);
            for &v in &deltas {
                writer.put_var_sign_zero(black_box(v)).unwrap();
            }
            writer.finish().unwrap();
        });
    });

    group.bench_function("var_sign_dec_zeros_base", |b| {
        b.iter(|| {
            let mut out = VecSink::with_capacity(VALUES * 4);
            let mut writer = BitWriter::new(&mut out);
            let mut prev = 0;
            for &v in &prices {
                prev = writer
                    .put_var_sign_dec_zeros_base(black_box(v), prev)
                    .unwrap();
            }
            writer.finish().unwrap();
        });
    });

    group.finish();
}

fn bench_get_varint_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_varint_families");
    let sizes = test_data::sizes(VALUES);
    let deltas = test_data::deltas(VALUES);

    let mut out = VecSink::new();
    let mut writer = BitWriter::new(&mut out);
    for (&s, &d) in sizes.iter().zip(&deltas) {
        writer.put_var_dec_zeros(s).unwrap();
        writer.put_var_sign_zero(d).unwrap();
    }
    writer.finish().unwrap();
    drop(writer);
    let encoded = out.into_inner();

    group.throughput(Throughput::Elements(2 * VALUES as u64));
    group.bench_function("dec_zeros_and_sign_zero", |b| {
        b.iter(|| {
            let mut reader = BitReader::new(black_box(&encoded));
            for _ in 0..VALUES {
                black_box(reader.get_var64_dec_zeros().unwrap());
                black_box(reader.get_var64_sign_zero().unwrap());
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_put_raw,
    bench_put_varint_families,
    bench_get_varint_families
);
criterion_main!(benches);
