//! Cosmic voice - slow, wobbling, echoing pad.
//!
//! # How It Works
//!
//! 1. Sine oscillator through a narrow band-pass (1 kHz, Q 4)
//! 2. An LFO between 5 and 8 Hz (picked per note) sweeps the band-pass
//!    cutoff ±100 Hz, so each note wobbles at its own speed
//! 3. The post-envelope signal also feeds a 400ms echo with 30% feedback
//! 4. Slow everything: 100ms attack, 400ms decay, two-second release
//!
//! The echo is part of the voice: its send fades out over the release and
//! the whole voice is dropped together.

use crate::{
    dsp::{filter::FilterType, oscillator::Waveform},
    voices::{
        auxiliary::{AuxSpec, VibratoTarget},
        profile::VoiceProfile,
    },
};

pub fn cosmic() -> VoiceProfile {
    VoiceProfile::builder("cosmic", Waveform::Sine)
        .envelope(0.1, 0.4, 0.4, 2.0)
        .filter(FilterType::BandPass, 1_000.0, 4.0)
        .aux(AuxSpec::Vibrato {
            rate_hz: 5.0,
            rate_jitter_hz: 3.0,
            depth: 100.0,
            target: VibratoTarget::FilterCutoff,
        })
        .aux(AuxSpec::DelaySend {
            delay_seconds: 0.4,
            feedback: 0.3,
            wet: 1.0,
        })
        .build()
}
