//! Benchmarks for wave-table oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::dsp::{oscillator::OscillatorBlock, PeriodicWave, Waveform};
use keybed::graph::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 0.5);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        let mut osc = OscillatorBlock::sine();
        group.bench_with_input(BenchmarkId::new("sine", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        // Band-limited tables are the same cost as sine once built
        let mut osc = OscillatorBlock::sawtooth();
        group.bench_with_input(BenchmarkId::new("sawtooth", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(&ctx));
            })
        });

        let mut osc = OscillatorBlock::square();
        group.bench_with_input(BenchmarkId::new("square", size), &size, |b, _| {
            b.iter(|| {
                osc.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    // Table synthesis happens on the control thread at note-on
    let wave = PeriodicWave::from_harmonics(&[1.0, 0.5, 0.33, 0.25, 0.2, 0.16, 0.14, 0.12]);
    group.bench_function("custom_table_build", |b| {
        b.iter(|| {
            let waveform = Waveform::Custom(wave.clone());
            black_box(OscillatorBlock::from_waveform(black_box(&waveform)))
        })
    });

    group.finish();
}
