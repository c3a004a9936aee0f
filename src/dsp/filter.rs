use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
| type              | passes          | rejects      |
| ----------------- | --------------- | ------------ |
| low-pass          | below cutoff    | above cutoff |
| high-pass         | above cutoff    | below cutoff |
| band-pass         | around cutoff   | both sides   |
| notch / band-stop | both sides      | at cutoff    |

Biquad (RBJ cookbook)
=====================

A biquad is a second-order IIR section: two poles, two zeros, 12 dB/octave.
Every response in the table above is the same difference equation with
different coefficients:

    y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]

Coefficients come from the cutoff and Q:

    w0    = 2π * cutoff / sample_rate
    alpha = sin(w0) / (2Q)

Q is resonance. 0.707 is a flat Butterworth response; higher Q adds a peak
at the cutoff; very low Q gives a soft, wide slope.

Coefficients are recomputed lazily: setters mark them dirty and the next
render refreshes them, so per-block modulation costs one trig evaluation
per block rather than per sample.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

#[derive(Debug, Clone, Copy, Default)]
struct Coefficients {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
}

#[derive(Debug, Clone)]
pub struct Biquad {
    filter_type: FilterType,
    cutoff_hz: f32,
    q: f32,

    coeffs: Coefficients,
    coeff_rate: f32, // sample rate the coefficients were computed for
    dirty: bool,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            filter_type,
            cutoff_hz,
            q,
            coeffs: Coefficients::default(),
            coeff_rate: 0.0,
            dirty: true,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
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

    fn refresh(&mut self, sample_rate: f32) {
        if !self.dirty && self.coeff_rate == sample_rate {
            return;
        }

        let cutoff = self.cutoff_hz.clamp(10.0, sample_rate * 0.49);
        let q = self.q.clamp(1e-4, 100.0);

        let w0 = TAU * cutoff / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2) = match self.filter_type {
            FilterType::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterType::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
            FilterType::BandPass => (alpha, 0.0, -alpha),
            FilterType::Notch => (1.0, -2.0 * cos_w0, 1.0),
        };
        let a0 = 1.0 + alpha;

        self.coeffs = Coefficients {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
        };
        self.coeff_rate = sample_rate;
        self.dirty = false;
    }

    /// Direct Form I, one sample.
    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let c = self.coeffs;
        let output = c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filter `buffer` in place.
    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        self.refresh(ctx.sample_rate);
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn q(&self) -> f32 {
        self.q
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        if cutoff != self.cutoff_hz {
            self.cutoff_hz = cutoff;
            self.dirty = true;
        }
    }

    pub fn set_q(&mut self, q: f32) {
        if q != self.q {
            self.q = q;
            self.dirty = true;
        }
    }
}
