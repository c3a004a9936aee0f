pub mod config;
pub mod dsp;
pub mod error;
pub mod graph; // Voice-level audio nodes, automation, shared signal chain
pub mod keyboard; // Computer-key to note tables for front-ends
pub mod pitch;
pub mod synth; // Polyphony engine and audio-thread renderer
pub mod voices; // Instrument voice catalogue

pub use config::EngineConfig;
pub use error::{KeybedError, Result};
pub use pitch::{NoteId, PitchClass};
pub use synth::engine::PolyphonyEngine;
pub use voices::{VoiceProfile, VoiceRegistry};

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Samples per modulation update inside a voice.
pub(crate) const CONTROL_BLOCK: usize = 64;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Upper bound on simultaneously controllable notes.
pub const MAX_POLYPHONY: usize = 16;

/// Released notes allowed to ring out at once. Past this the tail that
/// would end first is cut.
pub const MAX_RELEASING: usize = MAX_POLYPHONY * 2;
