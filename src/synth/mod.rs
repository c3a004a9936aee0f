// Purpose: note lifetimes, polyphony, and the control/audio thread split.
//
// The engine (control thread) decides what should sound and when; the
// renderer (audio thread) owns the voice graphs and plays them. They share
// only the audio clock and a queue of time-stamped commands.

pub mod backend;
pub mod engine;
pub mod message;
pub mod renderer;
pub mod table;
pub mod voice;

#[cfg(feature = "rtrb")]
pub use backend::{RealtimeRenderer, RingBackend};
pub use backend::{GraphBackend, OfflineBackend};
pub use engine::PolyphonyEngine;
pub use message::{GraphCommand, ParamTarget, VoiceId};
pub use renderer::Renderer;
