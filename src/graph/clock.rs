use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Shared audio clock, counted in rendered sample frames.
///
/// The renderer is the only writer. The control thread clones the handle and
/// reads it as "now" when scheduling automation, so everything the engine
/// schedules is expressed in the timeline the audio thread actually plays.
#[derive(Debug, Clone)]
pub struct AudioClock {
    frames: Arc<AtomicU64>,
    sample_rate: f32,
}

impl AudioClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Seconds since the renderer started.
    pub fn now(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Called by the renderer after each block.
    pub(crate) fn advance(&self, frames: usize) {
        self.frames.fetch_add(frames as u64, Ordering::AcqRel);
    }
}
