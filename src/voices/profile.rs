use crate::{
    dsp::{filter::FilterType, oscillator::Waveform},
    voices::auxiliary::AuxSpec,
};

/// Envelope timings. Times in seconds, sustain as a fraction of peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub const fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub kind: FilterType,
    pub cutoff_hz: f32,
    pub q: f32,
}

/// An instrument voice: everything needed to build the sound of one key.
///
/// Profiles are immutable once registered. The engine hands an
/// `Arc<VoiceProfile>` to each note so the release uses the profile the note
/// started with, even if the player has since switched voices.
#[derive(Debug, Clone)]
pub struct VoiceProfile {
    name: String,
    waveform: Waveform,
    envelope: Adsr,
    filter: FilterSettings,
    peak_scale: f32,
    aux: Vec<AuxSpec>,
}

impl VoiceProfile {
    pub fn builder(name: impl Into<String>, waveform: Waveform) -> VoiceProfileBuilder {
        VoiceProfileBuilder {
            profile: VoiceProfile {
                name: name.into(),
                waveform,
                envelope: Adsr::new(0.01, 0.1, 0.7, 0.3),
                filter: FilterSettings {
                    kind: FilterType::LowPass,
                    cutoff_hz: 20_000.0,
                    q: std::f32::consts::FRAC_1_SQRT_2,
                },
                peak_scale: 1.0,
                aux: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn waveform(&self) -> &Waveform {
        &self.waveform
    }

    pub fn envelope(&self) -> Adsr {
        self.envelope
    }

    pub fn filter(&self) -> FilterSettings {
        self.filter
    }

    /// Multiplier on velocity for the envelope peak.
    pub fn peak_scale(&self) -> f32 {
        self.peak_scale
    }

    pub fn aux(&self) -> &[AuxSpec] {
        &self.aux
    }

    /// Whether voices of this profile carry a delay send.
    pub fn has_send(&self) -> bool {
        self.aux.iter().any(|spec| matches!(spec, AuxSpec::DelaySend { .. }))
    }
}

pub struct VoiceProfileBuilder {
    profile: VoiceProfile,
}

impl VoiceProfileBuilder {
    /// Negative times and out-of-range sustain are clamped.
    pub fn envelope(mut self, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        self.profile.envelope = Adsr::new(
            attack.max(0.0),
            decay.max(0.0),
            sustain.clamp(0.0, 1.0),
            release.max(0.0),
        );
        self
    }

    pub fn filter(mut self, kind: FilterType, cutoff_hz: f32, q: f32) -> Self {
        self.profile.filter = FilterSettings { kind, cutoff_hz, q };
        self
    }

    pub fn peak_scale(mut self, scale: f32) -> Self {
        self.profile.peak_scale = scale.max(0.0);
        self
    }

    pub fn aux(mut self, spec: AuxSpec) -> Self {
        self.profile.aux.push(spec);
        self
    }

    pub fn build(self) -> VoiceProfile {
        self.profile
    }
}
