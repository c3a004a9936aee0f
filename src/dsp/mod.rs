//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are realtime-safe once built: nothing here allocates
//! after construction, so voices can carry them across to the audio thread.

/// Soft-knee dynamics compressor for the master bus.
pub mod compressor;
/// Circular delay buffer.
pub mod delay;
/// RBJ biquad with low/high/band-pass and notch responses.
pub mod filter;
/// Band-limited oscillators and custom periodic wave tables.
pub mod oscillator;

pub use filter::FilterType;
pub use oscillator::{PeriodicWave, Waveform};
