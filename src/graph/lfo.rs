use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An oscillator running at sub-audio rates to move a parameter over time.
The cosmic voice uses one at 5-8 Hz on its bandpass cutoff, which gives the
wobbling "wah" vibrato.

  Vibrato:    LFO → Pitch (±5-10 cents at 5-7 Hz)
  Auto-wah:   LFO → Filter Cutoff

Output is bipolar, -1.0 to +1.0. The modulated value is

    value = base + average(lfo block) * depth

Averaging over the block applies the modulation at control rate: one
parameter update per block, smooth enough at 64-sample blocks, and a
biquad only recomputes its coefficients once per block.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    frequency: f32, // Fixed frequency in Hz (ignores note context)
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            frequency,
        }
    }

    pub fn triangle(frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::triangle(),
            frequency,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // The LFO oscillates independently of the musical pitch
        let lfo_ctx = RenderCtx {
            frequency: self.frequency,
            ..*ctx
        };
        self.osc.render(out, &lfo_ctx);
    }
}

/// Mean of a block of modulation samples. Empty blocks average to 0.
#[inline]
pub fn block_average(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    buffer.iter().sum::<f32>() / buffer.len() as f32
}
