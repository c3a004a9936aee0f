use crate::{
    dsp::filter::{Biquad, FilterType},
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Voice Filter
============

Every voice runs its oscillators through one biquad before the gain stage.
The profile picks the response and where it sits:

  piano    lowpass 5200 Hz, Q 0.8   takes the edge off the triangle
  synth    lowpass 2500 Hz, Q 5     resonant peak, the classic squelch
  organ    lowpass 3000 Hz, Q 0.1   very soft slope, keeps the partials
  cosmic   bandpass 1000 Hz, Q 4    narrow band, swept by the vibrato LFO

Cutoff (Hz): where the response turns over.
  - 200 Hz:    muffled, like through a wall
  - 1000 Hz:   warm, round
  - 5000 Hz:   present, clear

Resonance (Q): emphasis at the cutoff.
  - 0.1:  no emphasis, gentle rolloff
  - 0.707: flat (Butterworth)
  - 5+:   strong peak, "squelchy"

Example usage:
  // Fixed lowpass
  let filter = FilterNode::lowpass(2500.0).with_q(5.0);

  // Swept by a vibrato LFO (±100 Hz around 1 kHz)
  let mut filter = FilterNode::bandpass(1000.0).with_q(4.0);
  let base = filter.get_param(FilterParam::Cutoff);
  filter.apply_modulation(FilterParam::Cutoff, base, lfo_value * 100.0);
*/

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterParam {
    Cutoff,
    Resonance,
}

pub struct FilterNode {
    filter: Biquad,
    base_cutoff: f32,
    base_q: f32,
}

impl FilterNode {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            filter: Biquad::new(filter_type, cutoff_hz, q),
            base_cutoff: cutoff_hz,
            base_q: q,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, std::f32::consts::FRAC_1_SQRT_2)
    }

    pub fn highpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::HighPass, cutoff_hz, std::f32::consts::FRAC_1_SQRT_2)
    }

    pub fn bandpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::BandPass, cutoff_hz, 1.0)
    }

    pub fn notch(cutoff_hz: f32) -> Self {
        Self::new(FilterType::Notch, cutoff_hz, 1.0)
    }

    pub fn with_q(mut self, q: f32) -> Self {
        self.base_q = q;
        self.filter.set_q(q);
        self
    }

    /// Cutoff currently in effect, modulation included.
    pub fn effective_cutoff(&self) -> f32 {
        self.filter.cutoff()
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    pub fn reset(&mut self) {
        self.filter.reset();
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.base_cutoff,
            FilterParam::Resonance => self.base_q,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        let final_value = base + modulation;
        match param {
            FilterParam::Cutoff => {
                self.base_cutoff = base;
                self.filter.set_cutoff(final_value.clamp(20.0, 20_000.0));
            }
            FilterParam::Resonance => {
                self.base_q = base;
                self.filter.set_q(final_value.clamp(0.01, 30.0));
            }
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }
}
