//! Synth voice - resonant, slightly unstable saw lead.
//!
//! # How It Works
//!
//! 1. Sawtooth oscillator provides the full harmonic spectrum
//! 2. Every note detunes the saw by a random ±5 cents, so chords beat and
//!    shimmer instead of locking together
//! 3. A quiet square (15%) sits 7 cents sharp underneath for body
//! 4. Resonant low-pass (2.5 kHz, Q 5) gives the squelchy peak
//! 5. 30ms attack, 100ms decay to half level, 400ms release

use crate::{
    dsp::{filter::FilterType, oscillator::Waveform},
    voices::{auxiliary::AuxSpec, profile::VoiceProfile},
};

pub fn synth() -> VoiceProfile {
    VoiceProfile::builder("synth", Waveform::Sawtooth)
        .envelope(0.03, 0.1, 0.5, 0.4)
        .filter(FilterType::LowPass, 2_500.0, 5.0)
        .aux(AuxSpec::DetunedPair {
            jitter_cents: 5.0,
            waveform: Waveform::Square,
            detune_cents: 7.0,
            level: 0.15,
        })
        .build()
}
