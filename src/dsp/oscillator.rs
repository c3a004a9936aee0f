use std::{
    f32::consts::TAU,
    sync::{Arc, OnceLock},
};

use crate::{
    error::{KeybedError, Result},
    graph::node::RenderCtx,
};

/*
Oscillator Waveforms
====================

  sine      fundamental only
  triangle  odd harmonics falling as 1/n²
  square    odd harmonics falling as 1/n
  sawtooth  every harmonic falling as 1/n
  custom    any harmonic recipe, rendered once into a wave table

Phase runs 0.0 → 1.0 once per cycle. Each sample we emit the waveform at
the current phase, then advance by `frequency / sample_rate`.

Square and sawtooth jump instantly, which folds energy above Nyquist back
into the audible band (aliasing). A PolyBLEP residual smooths the sample
either side of each jump; it costs a couple of multiplies and removes most
of the grit on high notes.

Custom waves are described the way additive synthesis describes them: a
cosine (`real`) and sine (`imag`) amplitude per harmonic. Index 0 is DC and
is ignored. The table is built on first use and normalized to a peak of 1.0.
*/

/// Samples in one cycle of a custom wave table.
pub const WAVE_TABLE_SIZE: usize = 2048;

/// Highest harmonic a table of `WAVE_TABLE_SIZE` can hold without folding.
pub const MAX_WAVE_HARMONICS: usize = WAVE_TABLE_SIZE / 2;

/// One rendered cycle of a custom waveform.
#[derive(Debug)]
pub struct WaveTable {
    samples: Vec<f32>,
}

impl WaveTable {
    /// Linear-interpolated lookup, `phase` in 0.0..1.0.
    #[inline]
    pub fn sample(&self, phase: f32) -> f32 {
        let position = phase * WAVE_TABLE_SIZE as f32;
        let index = position as usize % WAVE_TABLE_SIZE;
        let next = (index + 1) % WAVE_TABLE_SIZE;
        let frac = position - position.floor();
        self.samples[index] + (self.samples[next] - self.samples[index]) * frac
    }
}

/// Harmonic recipe for a custom waveform.
///
/// Construction never fails; the recipe is validated when a voice first needs
/// the table, so a bad recipe surfaces as a failed note-on rather than a
/// failed startup.
#[derive(Debug, Clone)]
pub struct PeriodicWave {
    real: Arc<[f32]>,
    imag: Arc<[f32]>,
    table: Arc<OnceLock<Arc<WaveTable>>>,
}

impl PeriodicWave {
    pub fn new(real: impl Into<Arc<[f32]>>, imag: impl Into<Arc<[f32]>>) -> Self {
        Self {
            real: real.into(),
            imag: imag.into(),
            table: Arc::new(OnceLock::new()),
        }
    }

    /// Sine-phase harmonics only, e.g. `[0.0, 1.0, 0.5]` for fundamental + half-level octave.
    pub fn from_harmonics(amplitudes: &[f32]) -> Self {
        let real = vec![0.0; amplitudes.len()];
        Self::new(real, amplitudes.to_vec())
    }

    fn validate(&self) -> Result<()> {
        if self.real.len() != self.imag.len() {
            return Err(KeybedError::UnsupportedWaveTable(format!(
                "{} cosine terms but {} sine terms",
                self.real.len(),
                self.imag.len()
            )));
        }
        if self.real.len() < 2 {
            return Err(KeybedError::UnsupportedWaveTable(
                "needs at least one harmonic above DC".into(),
            ));
        }
        if self.real.len() - 1 > MAX_WAVE_HARMONICS {
            return Err(KeybedError::UnsupportedWaveTable(format!(
                "{} harmonics exceeds the limit of {MAX_WAVE_HARMONICS}",
                self.real.len() - 1
            )));
        }
        if self.real.iter().chain(self.imag.iter()).any(|c| !c.is_finite()) {
            return Err(KeybedError::UnsupportedWaveTable(
                "coefficients must be finite".into(),
            ));
        }
        Ok(())
    }

    /// The rendered table, built and cached on first success.
    pub fn table(&self) -> Result<Arc<WaveTable>> {
        if let Some(table) = self.table.get() {
            return Ok(Arc::clone(table));
        }

        self.validate()?;

        let mut samples = vec![0.0f32; WAVE_TABLE_SIZE];
        for (i, sample) in samples.iter_mut().enumerate() {
            let phase = TAU * i as f32 / WAVE_TABLE_SIZE as f32;
            *sample = self
                .real
                .iter()
                .zip(self.imag.iter())
                .enumerate()
                .skip(1)
                .map(|(k, (re, im))| {
                    let angle = phase * k as f32;
                    re * angle.cos() + im * angle.sin()
                })
                .sum();
        }

        let peak = samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        if peak <= 1e-6 {
            return Err(KeybedError::UnsupportedWaveTable(
                "all harmonics are silent".into(),
            ));
        }
        for sample in samples.iter_mut() {
            *sample /= peak;
        }

        let table = self.table.get_or_init(|| Arc::new(WaveTable { samples }));
        Ok(Arc::clone(table))
    }
}

/// Oscillator shape as named by a voice profile.
#[derive(Debug, Clone)]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
    Custom(PeriodicWave),
}

/// A waveform ready to render: custom recipes resolved to their table.
#[derive(Debug, Clone)]
enum Shape {
    Sine,
    Triangle,
    Square,
    Sawtooth,
    Table(Arc<WaveTable>),
}

/// PolyBLEP residual for a discontinuity at phase 0.
#[inline]
fn poly_blep(phase: f32, increment: f32) -> f32 {
    if phase < increment {
        let t = phase / increment;
        t + t - t * t - 1.0
    } else if phase > 1.0 - increment {
        let t = (phase - 1.0) / increment;
        t * t + t + t + 1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct OscillatorBlock {
    shape: Shape,
    phase: f32,
}

impl OscillatorBlock {
    fn with_shape(shape: Shape) -> Self {
        Self { shape, phase: 0.0 }
    }

    pub fn sine() -> Self {
        Self::with_shape(Shape::Sine)
    }

    pub fn triangle() -> Self {
        Self::with_shape(Shape::Triangle)
    }

    pub fn square() -> Self {
        Self::with_shape(Shape::Square)
    }

    pub fn sawtooth() -> Self {
        Self::with_shape(Shape::Sawtooth)
    }

    /// Fails only for a custom waveform whose table cannot be built.
    pub fn from_waveform(waveform: &Waveform) -> Result<Self> {
        let shape = match waveform {
            Waveform::Sine => Shape::Sine,
            Waveform::Triangle => Shape::Triangle,
            Waveform::Square => Shape::Square,
            Waveform::Sawtooth => Shape::Sawtooth,
            Waveform::Custom(wave) => Shape::Table(wave.table()?),
        };
        Ok(Self::with_shape(shape))
    }

    /// Emit the sample at the current phase, then advance.
    #[inline]
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let increment = (frequency / sample_rate).clamp(0.0, 0.5);
        let phase = self.phase;

        let value = match &self.shape {
            Shape::Sine => (TAU * phase).sin(),
            Shape::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
            Shape::Square => {
                let naive = if phase < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(phase, increment) - poly_blep((phase + 0.5) % 1.0, increment)
            }
            Shape::Sawtooth => (2.0 * phase - 1.0) - poly_blep(phase, increment),
            Shape::Table(table) => table.sample(phase),
        };

        self.phase += increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        value
    }

    /// Fill `out` at `ctx.frequency`.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.next_sample(ctx.frequency, ctx.sample_rate);
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}
