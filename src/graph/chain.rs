use crate::{
    config::ChainConfig,
    dsp::{compressor::Compressor, filter::Biquad},
    graph::node::RenderCtx,
};

/// The mastering path every voice is summed into.
///
/// ```text
///   voices ──► bus ──► high-pass ──► low-pass ──► compressor ──► master gain ──► out
/// ```
///
/// Built once with the renderer and never touched per note.
#[derive(Debug, Clone)]
pub struct SignalChain {
    highpass: Biquad,
    lowpass: Biquad,
    compressor: Compressor,
    master_gain: f32,
}

impl SignalChain {
    pub fn new(config: &ChainConfig, sample_rate: f32) -> Self {
        Self {
            highpass: Biquad::highpass(config.highpass_hz),
            lowpass: Biquad::lowpass(config.lowpass_hz),
            compressor: Compressor::new(config.compressor, sample_rate),
            master_gain: config.master_gain,
        }
    }

    /// Process the summed voice bus in place.
    pub fn process(&mut self, bus: &mut [f32], ctx: &RenderCtx) {
        self.highpass.render(bus, ctx);
        self.lowpass.render(bus, ctx);
        self.compressor.render(bus);
        for sample in bus.iter_mut() {
            *sample *= self.master_gain;
        }
    }

    pub fn master_gain(&self) -> f32 {
        self.master_gain
    }

    /// Clear filter and compressor state.
    pub fn reset(&mut self) {
        self.highpass.reset();
        self.lowpass.reset();
        self.compressor.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorBlock;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn tone(frequency: f32, level: f32, len: usize) -> Vec<f32> {
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, frequency, 1.0);
        let mut buffer = vec![0.0; len];
        OscillatorBlock::sine().render(&mut buffer, &ctx);
        buffer.iter_mut().for_each(|s| *s *= level);
        buffer
    }

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn quiet_midrange_passes_at_master_gain() {
        let mut chain = SignalChain::new(&ChainConfig::default(), SAMPLE_RATE);
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 1_000.0, 1.0);
        // -40 dBFS sits below the compressor knee
        let mut bus = tone(1_000.0, 0.01, 9_600);
        chain.process(&mut bus, &ctx);

        let level = peak(&bus[4_800..]);
        assert!((level - 0.009).abs() < 0.001, "peak {level}");
    }

    #[test]
    fn rumble_is_removed() {
        let mut chain = SignalChain::new(&ChainConfig::default(), SAMPLE_RATE);
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 20.0, 1.0);
        let mut bus = tone(20.0, 0.01, 48_000);
        chain.process(&mut bus, &ctx);

        assert!(peak(&bus[24_000..]) < 0.002);
    }

    #[test]
    fn loud_bus_is_compressed() {
        let mut chain = SignalChain::new(&ChainConfig::default(), SAMPLE_RATE);
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);
        let mut bus = tone(440.0, 4.0, 48_000);
        chain.process(&mut bus, &ctx);

        assert!(peak(&bus[24_000..]) < 2.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut chain = SignalChain::new(&ChainConfig::default(), SAMPLE_RATE);
        let ctx = RenderCtx::from_freq(SAMPLE_RATE, 440.0, 1.0);
        let mut bus = tone(440.0, 1.0, 4_800);
        chain.process(&mut bus, &ctx);

        chain.reset();
        let mut silence = vec![0.0; 256];
        chain.process(&mut silence, &ctx);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
