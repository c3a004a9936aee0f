//! Organ voice - additive drawbar-style tone.
//!
//! Three extra sines at 2×, 3× and 4× the note frequency sit on top of the
//! fundamental, each quieter than the last (velocity × 0.75 / ratio). The
//! envelope is almost a gate: 5ms in, straight to 98%, 80ms out.
//!
//! The low-pass is soft (Q 0.1) and leaves the upper partials intact.

use crate::{
    dsp::{filter::FilterType, oscillator::Waveform},
    voices::{auxiliary::AuxSpec, profile::VoiceProfile},
};

pub fn organ() -> VoiceProfile {
    VoiceProfile::builder("organ", Waveform::Sine)
        .envelope(0.005, 0.01, 0.98, 0.08)
        .filter(FilterType::LowPass, 3_000.0, 0.1)
        .aux(AuxSpec::HarmonicStack {
            waveform: Waveform::Sine,
            ratios: vec![2.0, 3.0, 4.0],
            level: 0.75,
        })
        .build()
}
