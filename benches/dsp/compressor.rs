//! Benchmarks for the master-bus compressor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::{config::CompressorConfig, dsp::compressor::Compressor};

use crate::BLOCK_SIZES;

pub fn bench_compressor(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/compressor");

    for &size in BLOCK_SIZES {
        // Loud enough to sit in the knee
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin() * 0.3).collect();
        let mut compressor = Compressor::new(CompressorConfig::default(), 48_000.0);
        let mut buffer = input.clone();

        group.bench_with_input(BenchmarkId::new("soft_knee", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                compressor.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
