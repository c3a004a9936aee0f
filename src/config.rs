//! Engine tunables.
//!
//! Everything here has a sensible default matching the stock instrument, so
//! `EngineConfig::default()` is what the front-end runs with. The `with_*`
//! setters exist for embedders and tests.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::MAX_POLYPHONY;

/// Settings for the master-bus dynamics compressor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorConfig {
    /// Level (dBFS) above which gain reduction starts.
    pub threshold_db: f32,
    /// Width of the soft knee in dB, centered on the threshold.
    pub knee_db: f32,
    /// Input dB over threshold per output dB over threshold.
    pub ratio: f32,
    /// Seconds to react to a rising level.
    pub attack: f32,
    /// Seconds to recover once the level falls.
    pub release: f32,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            threshold_db: -24.0,
            knee_db: 30.0,
            ratio: 4.0,
            attack: 0.010,
            release: 0.250,
        }
    }
}

/// The shared mastering chain every voice is summed into.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainConfig {
    /// Rumble filter cutoff.
    pub highpass_hz: f32,
    /// Harshness filter cutoff.
    pub lowpass_hz: f32,
    pub compressor: CompressorConfig,
    pub master_gain: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            highpass_hz: 100.0,
            lowpass_hz: 10_000.0,
            compressor: CompressorConfig::default(),
            master_gain: 0.9,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz. Front-ends overwrite this with the device rate.
    pub sample_rate: f32,
    /// Maximum number of notes held in the active voice table.
    pub max_polyphony: usize,
    /// Velocity used by front-ends that have no velocity sensing.
    pub default_velocity: f32,
    /// Extra seconds after a release ramp before oscillators are stopped.
    pub release_tail: f64,
    /// Slots in the control → audio command ring.
    pub command_capacity: usize,
    /// Profile selected when the engine starts.
    pub default_voice: String,
    /// Seed for per-note jitter (detune, LFO rate). `None` seeds from the clock.
    pub seed: Option<u64>,
    pub chain: ChainConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_polyphony: MAX_POLYPHONY,
            default_velocity: 0.35,
            release_tail: 0.01,
            command_capacity: 1024,
            default_voice: "piano".to_string(),
            seed: None,
            chain: ChainConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Clamped to `1..=MAX_POLYPHONY`.
    pub fn with_max_polyphony(mut self, voices: usize) -> Self {
        self.max_polyphony = voices.clamp(1, MAX_POLYPHONY);
        self
    }

    pub fn with_default_voice(mut self, name: impl Into<String>) -> Self {
        self.default_voice = name.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_command_capacity(mut self, slots: usize) -> Self {
        self.command_capacity = slots.max(1);
        self
    }

    pub fn with_chain(mut self, chain: ChainConfig) -> Self {
        self.chain = chain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_instrument() {
        let config = EngineConfig::default();
        assert_eq!(config.max_polyphony, 16);
        assert_eq!(config.default_voice, "piano");
        assert!((config.chain.master_gain - 0.9).abs() < 1e-6);
        assert!((config.chain.compressor.ratio - 4.0).abs() < 1e-6);
        assert!((config.chain.compressor.attack - 0.010).abs() < 1e-6);
    }

    #[test]
    fn polyphony_is_clamped() {
        assert_eq!(EngineConfig::default().with_max_polyphony(0).max_polyphony, 1);
        assert_eq!(EngineConfig::default().with_max_polyphony(64).max_polyphony, MAX_POLYPHONY);
        assert_eq!(EngineConfig::default().with_max_polyphony(4).max_polyphony, 4);
    }
}
