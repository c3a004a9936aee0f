//! Benchmarks for delay line operations.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::dsp::delay::DelayLine;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let delay_times: &[usize] = &[
        480,   // 10ms at 48kHz
        19200, // 400ms, the cosmic echo
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();

        for &delay_samples in delay_times {
            let delay_ms = delay_samples as f32 / 48.0;

            let mut delay = DelayLine::new(delay_samples);
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(
                BenchmarkId::new(format!("feedback_{delay_ms:.0}ms"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        for (out, &x) in buffer.iter_mut().zip(input.iter()) {
                            let echo = delay.read(delay_samples);
                            delay.write(x + echo * 0.3);
                            *out = echo;
                        }
                        black_box(&buffer);
                    })
                },
            );
        }
    }

    group.finish();
}
