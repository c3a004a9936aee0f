//! The instrument's voice catalogue.
//!
//! Each voice is a [`VoiceProfile`]: oscillator shape, envelope, filter and
//! any extras. The stock catalogue, in the order the front-end cycles
//! through it:
//!
//! | voice  | character                                         |
//! |--------|---------------------------------------------------|
//! | piano  | soft triangle, quick settle (default)             |
//! | synth  | resonant saw with a detuned square underneath     |
//! | organ  | sine plus three harmonic partials                 |
//! | cosmic | band-passed sine, LFO wobble, long echo tail      |
//!
//! # Example
//!
//! ```ignore
//! use keybed::voices::{self, VoiceRegistry};
//!
//! let registry = VoiceRegistry::builder()
//!     .register(voices::piano())?
//!     .register(my_custom_voice())?
//!     .build();
//! ```

pub mod auxiliary;
pub mod profile;

mod cosmic;
mod organ;
mod piano;
mod synth;

use std::sync::Arc;

pub use auxiliary::{AuxContext, AuxNode, AuxSpec, VibratoTarget};
pub use cosmic::cosmic;
pub use organ::organ;
pub use piano::piano;
pub use profile::{Adsr, FilterSettings, VoiceProfile, VoiceProfileBuilder};
pub use synth::synth;

use crate::error::{KeybedError, Result};

/// Read-only, ordered set of voice profiles, fixed once built.
#[derive(Debug, Clone)]
pub struct VoiceRegistry {
    profiles: Vec<Arc<VoiceProfile>>,
}

impl VoiceRegistry {
    /// piano, synth, organ, cosmic.
    pub fn standard() -> Self {
        Self {
            profiles: vec![
                Arc::new(piano()),
                Arc::new(synth()),
                Arc::new(organ()),
                Arc::new(cosmic()),
            ],
        }
    }

    pub fn builder() -> VoiceRegistryBuilder {
        VoiceRegistryBuilder {
            profiles: Vec::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<VoiceProfile>> {
        self.profiles
            .iter()
            .find(|profile| profile.name() == name)
            .cloned()
            .ok_or_else(|| KeybedError::UnknownVoice(name.to_string()))
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|profile| profile.name()).collect()
    }

    pub fn first(&self) -> Option<Arc<VoiceProfile>> {
        self.profiles.first().cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for VoiceRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct VoiceRegistryBuilder {
    profiles: Vec<Arc<VoiceProfile>>,
}

impl VoiceRegistryBuilder {
    /// Start from the stock catalogue instead of an empty one.
    pub fn with_standard_voices(mut self) -> Self {
        self.profiles.extend(VoiceRegistry::standard().profiles);
        self
    }

    pub fn register(mut self, profile: VoiceProfile) -> Result<Self> {
        if self.profiles.iter().any(|p| p.name() == profile.name()) {
            return Err(KeybedError::DuplicateVoice(profile.name().to_string()));
        }
        self.profiles.push(Arc::new(profile));
        Ok(self)
    }

    pub fn build(self) -> VoiceRegistry {
        VoiceRegistry {
            profiles: self.profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{filter::FilterType, oscillator::Waveform};

    #[test]
    fn standard_catalogue_in_display_order() {
        let registry = VoiceRegistry::standard();
        assert_eq!(registry.names(), vec!["piano", "synth", "organ", "cosmic"]);
    }

    #[test]
    fn stock_values() {
        let registry = VoiceRegistry::standard();

        let piano = registry.lookup("piano").unwrap();
        assert_eq!(piano.envelope(), Adsr::new(0.012, 0.06, 0.26, 0.18));
        assert_eq!(piano.filter().kind, FilterType::LowPass);
        assert_eq!(piano.filter().cutoff_hz, 5_200.0);
        assert!(piano.aux().is_empty());

        let cosmic = registry.lookup("cosmic").unwrap();
        assert_eq!(cosmic.envelope().release, 2.0);
        assert_eq!(cosmic.filter().kind, FilterType::BandPass);
        assert!(cosmic.has_send());

        let organ = registry.lookup("organ").unwrap();
        assert!(matches!(
            &organ.aux()[0],
            AuxSpec::HarmonicStack { ratios, .. } if ratios == &vec![2.0, 3.0, 4.0]
        ));
    }

    #[test]
    fn unknown_voice_is_an_error() {
        let registry = VoiceRegistry::standard();
        assert_eq!(
            registry.lookup("theremin").unwrap_err(),
            KeybedError::UnknownVoice("theremin".into())
        );
    }

    #[test]
    fn builder_rejects_duplicates() {
        let result = VoiceRegistry::builder()
            .with_standard_voices()
            .register(piano());
        assert!(matches!(result, Err(KeybedError::DuplicateVoice(name)) if name == "piano"));
    }

    #[test]
    fn builder_appends_in_order() {
        let bell = VoiceProfile::builder("bell", Waveform::Sine)
            .envelope(0.001, 1.5, 0.0, 1.0)
            .build();
        let registry = VoiceRegistry::builder()
            .register(organ())
            .and_then(|b| b.register(bell))
            .unwrap()
            .build();

        assert_eq!(registry.names(), vec!["organ", "bell"]);
        assert_eq!(registry.first().unwrap().name(), "organ");
    }
}
