//! Benchmarks for one complete voice graph per profile.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::{
    graph::{Automation, GraphNode, RenderCtx},
    synth::{voice::VoiceGraph, ParamTarget, VoiceId},
    VoiceRegistry,
};
use rand::{rngs::SmallRng, SeedableRng};

use crate::BLOCK_SIZES;

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let ctx = RenderCtx::from_freq(48_000.0, 0.0, 0.0);
    let registry = VoiceRegistry::standard();
    let note = "A3".parse().unwrap(); // mid-keyboard
    let mut rng = SmallRng::seed_from_u64(1);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for name in registry.names() {
            let profile = registry.lookup(name).unwrap();
            let mut voice =
                VoiceGraph::build(VoiceId(1), note, 0.35, &profile, 0.0, 48_000.0, &mut rng).unwrap();
            // held at sustain so the gain stage is not skipped
            voice.automate(
                ParamTarget::Gain,
                Automation::SetValueAtTime {
                    value: 0.2,
                    time: 0.0,
                },
            );

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    voice.render_block(black_box(&mut buffer), black_box(&ctx));
                })
            });
        }
    }

    group.finish();
}
