//! Piano voice - soft, quickly settling keys.
//!
//! Not a sampled piano, but it answers the same way: a bright strike that
//! drops to a low, steady body, and a short tail on release.
//!
//! # How It Works
//!
//! 1. Triangle wave: soft odd harmonics, a little reedy
//! 2. 12ms attack, fast enough to feel percussive without clicking
//! 3. 60ms decay down to 26% of the peak
//! 4. 180ms release
//! 5. Low-pass at 5.2 kHz (Q 0.8) takes the edge off the triangle
//!
//! # Variations
//!
//! - Lower sustain (0.1) = more like a struck string dying away
//! - Longer release (0.5) = sustain-pedal feel

use crate::{
    dsp::{filter::FilterType, oscillator::Waveform},
    voices::profile::VoiceProfile,
};

/// The default voice.
pub fn piano() -> VoiceProfile {
    VoiceProfile::builder("piano", Waveform::Triangle)
        .envelope(0.012, 0.06, 0.26, 0.18)
        .filter(FilterType::LowPass, 5_200.0, 0.8)
        .build()
}
