use keybed::{synth::OfflineBackend, EngineConfig, NoteId, PolyphonyEngine};

fn engine() -> PolyphonyEngine<OfflineBackend> {
    let config = EngineConfig::default().with_seed(3);
    PolyphonyEngine::with_standard_voices(OfflineBackend::new(&config), config).unwrap()
}

fn note(name: &str) -> NoteId {
    name.parse().unwrap()
}

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn rms(samples: &[f32]) -> f32 {
    (samples.iter().map(|&x| x * x).sum::<f32>() / samples.len().max(1) as f32).sqrt()
}

#[test]
fn renders_silence_with_no_notes() {
    let mut engine = engine();
    let out = engine.backend_mut().render_seconds(0.1);
    assert_eq!(out.len(), 4_800);
    assert!(out.iter().all(|&s| s == 0.0));
}

#[test]
fn every_voice_sounds_and_stays_in_range() {
    let mut engine = engine();
    let names: Vec<String> = engine
        .voice_profile_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    for name in names {
        engine.set_active_voice_profile(&name).unwrap();
        engine.start_note(note("A4"), 0.35).unwrap();
        let held = engine.backend_mut().render_seconds(0.3);
        engine.stop_note(note("A4")).unwrap();
        let tail = engine.backend_mut().render_seconds(2.5);

        assert!(rms(&held) > 1e-3, "{name} is silent");
        assert!(held.iter().chain(tail.iter()).all(|s| s.is_finite()), "{name} produced NaN");
        assert!(peak(&held) <= 1.0, "{name} clips");
        assert!(peak(&tail[tail.len() - 4_800..]) < 1e-3, "{name} never decays");
    }
}

#[test]
fn full_chord_renders_cleanly() {
    let mut engine = engine();
    engine.set_active_voice_profile("synth").unwrap();
    for semitone in 48..64 {
        let n = NoteId::from_semitone(semitone).unwrap();
        engine.start_note(n, 1.0).unwrap();
    }
    assert_eq!(engine.voice_count(), 16);

    let out = engine.backend_mut().render_seconds(0.5);
    assert!(out.iter().all(|s| s.is_finite()));
    assert!(rms(&out) > 0.01);
}

#[test]
fn stolen_voice_leaves_the_renderer() {
    let mut engine = engine();
    for semitone in 48..64 {
        engine.start_note(NoteId::from_semitone(semitone).unwrap(), 0.5).unwrap();
    }
    engine.backend_mut().render_seconds(0.05);
    assert_eq!(engine.backend().renderer().voice_count(), 16);

    engine.start_note(note("C6"), 0.5).unwrap();
    engine.backend_mut().render_seconds(0.01);
    assert_eq!(engine.backend().renderer().voice_count(), 16);
}

#[test]
fn release_fades_out() {
    let mut engine = engine();
    engine.start_note(note("C4"), 0.5).unwrap();
    let held = engine.backend_mut().render_seconds(0.3);
    engine.stop_note(note("C4")).unwrap();
    let release = engine.backend_mut().render_seconds(0.2);

    // piano releases over 0.18 s
    let start = rms(&release[..960]);
    let end = rms(&release[release.len() - 960..]);
    assert!(rms(&held[held.len() - 960..]) > 0.0);
    assert!(end < start * 0.1);
}

#[test]
fn cosmic_echo_outlives_the_dry_release() {
    let mut engine = engine();
    engine.set_active_voice_profile("cosmic").unwrap();
    engine.start_note(note("E4"), 0.6).unwrap();
    engine.backend_mut().render_seconds(0.6);
    engine.stop_note(note("E4")).unwrap();

    let release = engine.backend_mut().render_seconds(1.0);
    assert!(rms(&release) > 1e-3);
    assert!(release.iter().all(|s| s.is_finite()));
}

#[test]
fn same_seed_renders_identically() {
    let render = || {
        let mut engine = engine();
        engine.set_active_voice_profile("synth").unwrap();
        engine.start_note(note("G3"), 0.5).unwrap();
        engine.backend_mut().render_seconds(0.2)
    };
    assert_eq!(render(), render());
}
