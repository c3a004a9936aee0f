use crate::{
    dsp::delay::DelayLine,
    graph::node::{GraphNode, RenderCtx},
};

/// Feedback echo.
///
/// Each repeat comes back `delay_seconds` later, scaled by `feedback`:
///
/// ```text
///   in ──►(+)──► [ delay ] ──┬──► out
///          ▲                 │
///          └──── × feedback ◄┘
/// ```
///
/// Output is the wet signal only; the caller decides how much of it to mix.
pub struct DelayNode {
    delay_line: DelayLine,
    delay_seconds: f32,
    feedback: f32,
}

impl DelayNode {
    /// The buffer is sized here, so build on the control thread.
    pub fn new(delay_seconds: f32, feedback: f32, sample_rate: f32) -> Self {
        Self {
            delay_line: DelayLine::with_seconds(delay_seconds, sample_rate),
            delay_seconds,
            // anything at or above 1.0 would never decay
            feedback: feedback.clamp(0.0, 0.95),
        }
    }

    pub fn delay_seconds(&self) -> f32 {
        self.delay_seconds
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn reset(&mut self) {
        self.delay_line.reset();
    }
}

impl GraphNode for DelayNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let delay_samples = (self.delay_seconds * ctx.sample_rate).round() as usize;
        for sample in out.iter_mut() {
            let delayed = self.delay_line.read(delay_samples);
            self.delay_line.write(*sample + delayed * self.feedback);
            *sample = delayed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_decay_by_feedback() {
        let sample_rate = 1_000.0;
        let mut delay = DelayNode::new(0.01, 0.5, sample_rate);
        let ctx = RenderCtx::from_freq(sample_rate, 440.0, 1.0);

        let mut buffer = vec![0.0; 40];
        buffer[0] = 1.0;
        delay.render_block(&mut buffer, &ctx);

        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[10], 1.0);
        assert_eq!(buffer[20], 0.5);
        assert_eq!(buffer[30], 0.25);
    }

    #[test]
    fn feedback_is_bounded() {
        let delay = DelayNode::new(0.4, 3.0, 48_000.0);
        assert!(delay.feedback() < 1.0);
    }
}
