use crate::{
    dsp::oscillator::{OscillatorBlock, Waveform},
    error::Result,
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Audio Oscillator
================

The sound source of every voice. Each key press builds one primary
oscillator from the voice profile's waveform; some profiles add more (a
detuned square under the synth saw, harmonic sines under the organ).

Waveform Character
------------------

  Sine:      fundamental only. Smooth, hollow, flute-like.
  Triangle:  weak odd harmonics (1/n²). Soft, a little reedy.
  Square:    odd harmonics (1/n). Hollow and woody.
  Sawtooth:  every harmonic (1/n). Bright and buzzy, the usual subtractive
             starting point.
  Custom:    any harmonic recipe, see `dsp::oscillator::PeriodicWave`.

Pitch
-----

By default the oscillator follows `ctx.frequency`, the note being played.
`with_frequency` pins it instead, which the organ uses for its ×2, ×3, ×4
partials. Detune is in cents (100 cents = 1 semitone):

    frequency = base * 2^(cents / 1200)

Start and Stop
--------------

Oscillators are scheduled, not switched. `start` and `stop_at` take audio
clock times; outside that window the node renders silence. Once the clock
passes the stop time the node reports `is_active() == false` and the
renderer can retire the voice.
*/

pub struct OscNode {
    osc: OscillatorBlock,
    /// Fixed frequency (Hz). If Some, ignores ctx.frequency.
    base_frequency: Option<f32>,
    /// Current frequency after modulation (only used when base_frequency is Some)
    current_frequency: f32,
    /// Detune in cents. Modulation writes here too.
    detune_cents: f32,
    /// Detune the node was built with, before modulation.
    base_detune: f32,
    start: f64,
    stop: Option<f64>,
    /// Clock time reached by the last rendered block.
    rendered_until: f64,
}

/// Parameters that can be modulated on an oscillator
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OscParam {
    /// Oscillator frequency in Hz (fixed-frequency oscillators only)
    Frequency,
    /// Detune in cents (100 cents = 1 semitone)
    Detune,
}

impl OscNode {
    fn new(osc: OscillatorBlock) -> Self {
        Self {
            osc,
            base_frequency: None,
            current_frequency: 440.0,
            detune_cents: 0.0,
            base_detune: 0.0,
            start: 0.0,
            stop: None,
            rendered_until: 0.0,
        }
    }

    pub fn sine() -> Self {
        Self::new(OscillatorBlock::sine())
    }

    pub fn sawtooth() -> Self {
        Self::new(OscillatorBlock::sawtooth())
    }

    pub fn square() -> Self {
        Self::new(OscillatorBlock::square())
    }

    pub fn triangle() -> Self {
        Self::new(OscillatorBlock::triangle())
    }

    /// Fails if a custom wave table cannot be built.
    pub fn from_waveform(waveform: &Waveform) -> Result<Self> {
        Ok(Self::new(OscillatorBlock::from_waveform(waveform)?))
    }

    /// Set a fixed frequency, ignoring the note pitch from RenderCtx.
    pub fn with_frequency(mut self, freq: f32) -> Self {
        self.base_frequency = Some(freq);
        self.current_frequency = freq;
        self
    }

    pub fn with_detune(mut self, cents: f32) -> Self {
        self.set_detune(cents);
        self
    }

    pub fn set_detune(&mut self, cents: f32) {
        self.detune_cents = cents;
        self.base_detune = cents;
    }

    pub fn detune(&self) -> f32 {
        self.detune_cents
    }

    /// Begin sounding at clock time `at`.
    pub fn start(&mut self, at: f64) {
        self.start = at;
    }

    /// Fall silent at clock time `at`. An earlier stop wins over a later one.
    pub fn stop_at(&mut self, at: f64) {
        self.stop = Some(match self.stop {
            Some(existing) => existing.min(at),
            None => at,
        });
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop
    }

    #[inline]
    fn sounding_at(&self, time: f64) -> bool {
        time >= self.start && self.stop.is_none_or(|stop| time < stop)
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let base_freq = if self.base_frequency.is_some() {
            self.current_frequency
        } else {
            ctx.frequency
        };

        // frequency * 2^(cents/1200)
        let frequency = if self.detune_cents != 0.0 {
            base_freq * 2.0_f32.powf(self.detune_cents / 1200.0)
        } else {
            base_freq
        };

        for (i, sample) in out.iter_mut().enumerate() {
            *sample = if self.sounding_at(ctx.sample_time(i)) {
                self.osc.next_sample(frequency, ctx.sample_rate)
            } else {
                0.0
            };
        }
        self.rendered_until = ctx.sample_time(out.len());
    }

    fn is_active(&self) -> bool {
        self.stop.is_none_or(|stop| self.rendered_until < stop)
    }
}

impl Modulatable for OscNode {
    type Param = OscParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            OscParam::Frequency => self.base_frequency.unwrap_or(self.current_frequency),
            OscParam::Detune => self.base_detune,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, base: f32, modulation: f32) {
        match param {
            OscParam::Frequency => {
                // Clamp to audible range (20 Hz - 20 kHz)
                self.current_frequency = (base + modulation).clamp(20.0, 20_000.0);
            }
            OscParam::Detune => {
                // Clamp to ±2 semitones
                self.detune_cents = (base + modulation).clamp(-200.0, 200.0);
            }
        }
    }
}
