//! Voice-level building blocks and the shared mastering chain.
//!
//! Graph nodes wrap the low-level DSP primitives with what a playing voice
//! needs: scheduled start/stop, block rendering against the audio clock,
//! parameter modulation, and automation timelines.

/// The fixed mastering chain all voices feed.
pub mod chain;
/// Shared sample-frame clock.
pub mod clock;
/// Feedback delay used by delay sends.
pub mod delay;
/// Biquad filter node with modulatable cutoff.
pub mod filter;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators with scheduled start/stop.
pub mod oscillator;
/// Automation timelines (set / ramp / cancel).
pub mod param;

pub use chain::SignalChain;
pub use clock::AudioClock;
pub use node::{GraphNode, Modulatable, RenderCtx};
pub use param::{AudioParam, Automation};
