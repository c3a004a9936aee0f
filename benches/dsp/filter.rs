//! Benchmarks for the biquad filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::dsp::filter::Biquad;
use keybed::graph::RenderCtx;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let ctx = RenderCtx::from_freq(48_000.0, 440.0, 0.5);

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let filters = [
            ("lowpass", Biquad::lowpass(2_500.0)),
            ("highpass", Biquad::highpass(100.0)),
            ("bandpass", Biquad::bandpass(1_000.0)),
            ("notch", Biquad::notch(1_000.0)),
        ];
        for (name, mut filter) in filters {
            filter.set_q(4.0);
            let mut buffer = input.clone();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }

        // Vibrato retunes the cutoff every control block
        let mut filter = Biquad::bandpass(1_000.0);
        let mut buffer = input.clone();
        let mut cutoff = 900.0f32;
        group.bench_with_input(BenchmarkId::new("bandpass_swept", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 1_100.0 { 900.0 } else { cutoff + 7.0 };
                filter.set_cutoff(cutoff);
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&ctx));
            })
        });
    }

    group.finish();
}
