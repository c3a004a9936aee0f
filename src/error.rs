use thiserror::Error;

/// Everything that can go wrong while handling a single note or control event.
///
/// None of these are fatal: the engine keeps accepting events after any of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KeybedError {
    #[error("unknown pitch class `{0}`")]
    UnknownPitchClass(String),

    #[error("note `{0}` has no octave number")]
    MissingOctave(String),

    #[error("invalid octave in note `{0}`")]
    InvalidOctave(String),

    #[error("no voice profile named `{0}`")]
    UnknownVoice(String),

    #[error("voice profile `{0}` is already registered")]
    DuplicateVoice(String),

    #[error("velocity must be a number, got {0}")]
    InvalidVelocity(f32),

    #[error("unsupported wave table: {0}")]
    UnsupportedWaveTable(String),

    #[error("audio command queue is full ({needed} slots needed, {available} free)")]
    CommandQueueFull { needed: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, KeybedError>;
