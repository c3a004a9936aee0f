//! Benchmarks for automation curve evaluation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::graph::AudioParam;

use crate::BLOCK_SIZES;

pub fn bench_param(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/param");

    // A note-on envelope: silent, attack, decay to sustain
    let mut envelope = AudioParam::new(0.0);
    envelope.set_value_at_time(0.0, 0.0);
    envelope.linear_ramp_to_value_at_time(0.35, 0.03);
    envelope.linear_ramp_to_value_at_time(0.175, 0.13);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Mid-ramp: every sample interpolates
        group.bench_with_input(BenchmarkId::new("fill_ramp", size), &size, |b, _| {
            b.iter(|| envelope.fill(black_box(&mut buffer), black_box(0.01), 48_000.0))
        });

        // Past the last event: constant hold
        group.bench_with_input(BenchmarkId::new("fill_hold", size), &size, |b, _| {
            b.iter(|| envelope.fill(black_box(&mut buffer), black_box(1.0), 48_000.0))
        });
    }

    group.bench_function("value_at", |b| {
        b.iter(|| black_box(envelope.value_at(black_box(0.08))))
    });

    group.finish();
}
