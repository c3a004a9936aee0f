//! Benchmarks for the full engine: sixteen held notes through the renderer
//! and master chain, and the control-side cost of note events.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keybed::{synth::OfflineBackend, EngineConfig, NoteId, PolyphonyEngine, MAX_POLYPHONY};

use crate::BLOCK_SIZES;

fn chord(engine: &mut PolyphonyEngine<OfflineBackend>) {
    for semitone in 48..48 + MAX_POLYPHONY as i32 {
        if let Some(note) = NoteId::from_semitone(semitone) {
            engine.start_note(note, 0.35).unwrap();
        }
    }
}

fn engine(profile: &str) -> PolyphonyEngine<OfflineBackend> {
    let config = EngineConfig::default().with_seed(5).with_default_voice(profile);
    PolyphonyEngine::with_standard_voices(OfflineBackend::new(&config), config).unwrap()
}

pub fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/polyphony");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for profile in ["piano", "synth", "organ", "cosmic"] {
            let mut engine = engine(profile);
            chord(&mut engine);
            // past the attack so every voice is at sustain
            engine.backend_mut().render_seconds(0.5);

            group.bench_with_input(
                BenchmarkId::new(format!("{profile}_x16"), size),
                &size,
                |b, _| {
                    b.iter(|| {
                        engine.backend_mut().render(black_box(&mut buffer));
                    })
                },
            );
        }
    }

    // Control thread: note-on at a full table steals, then note-off
    let mut engine = engine("synth");
    chord(&mut engine);
    let mut semitone = 72;
    group.bench_function("steal_and_release", |b| {
        b.iter(|| {
            semitone = if semitone >= 96 { 72 } else { semitone + 1 };
            let note = NoteId::from_semitone(semitone).unwrap();
            engine.start_note(black_box(note), 0.35).unwrap();
            engine.stop_note(note).unwrap();
            // keep the renderer's queue and voice list bounded
            engine.backend_mut().render_seconds(0.001);
        })
    });

    group.finish();
}
