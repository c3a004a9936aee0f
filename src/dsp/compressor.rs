use crate::config::CompressorConfig;

/*
Dynamics Compressor
===================

A compressor turns loud passages down so that a stack of voices summed on
one bus does not clip.

    level_db  = 20 * log10(envelope)
    reduction = knee curve(level_db)          (always <= 0 dB)
    output    = input * 10^(reduction / 20)

The envelope follows the rectified signal with separate time constants: it
rises with `attack` and falls with `release`. Each is a one-pole smoother

    coeff = 1 - exp(-1 / (seconds * sample_rate))

so `attack` is roughly the time to cover 63% of a step.

Soft knee
---------

Below `threshold - knee/2` nothing happens; above `threshold + knee/2` the
full ratio applies; in between the reduction grows quadratically so the
transition has no corner:

      out dB
        |            ___----- ratio 4:1
        |        _--´
        |     _-´   ← knee (30 dB wide)
        |   /
        |  /  1:1
        +------------------ in dB
               threshold
*/

/// Gain change in dB for an input level, never positive.
fn soft_knee_reduction(input_db: f32, threshold: f32, ratio: f32, knee: f32) -> f32 {
    let half_knee = knee / 2.0;
    let slope = 1.0 - 1.0 / ratio.max(1.0);

    if input_db <= threshold - half_knee {
        0.0
    } else if knee <= 0.0 || input_db >= threshold + half_knee {
        (threshold - input_db) * slope
    } else {
        let x = input_db - threshold + half_knee;
        -slope * x * x / (2.0 * knee)
    }
}

fn smoothing_coeff(seconds: f32, sample_rate: f32) -> f32 {
    if seconds <= 0.0 {
        1.0
    } else {
        1.0 - (-1.0 / (seconds * sample_rate)).exp()
    }
}

#[derive(Debug, Clone)]
pub struct Compressor {
    config: CompressorConfig,
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl Compressor {
    pub fn new(config: CompressorConfig, sample_rate: f32) -> Self {
        Self {
            config,
            attack_coeff: smoothing_coeff(config.attack, sample_rate),
            release_coeff: smoothing_coeff(config.release, sample_rate),
            envelope: 0.0,
        }
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let level = input.abs();
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope += coeff * (level - self.envelope);

        input * self.current_gain()
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    /// Linear gain the compressor is applying right now.
    pub fn current_gain(&self) -> f32 {
        if self.envelope <= 1e-9 {
            return 1.0;
        }
        let level_db = 20.0 * self.envelope.log10();
        let reduction = soft_knee_reduction(
            level_db,
            self.config.threshold_db,
            self.config.ratio,
            self.config.knee_db,
        );
        10.0_f32.powf(reduction / 20.0)
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn quiet_signal_passes_untouched() {
        let mut comp = Compressor::new(CompressorConfig::default(), SAMPLE_RATE);
        // -60 dBFS is far below the knee
        let mut buffer = vec![0.001; 4_800];
        comp.render(&mut buffer);
        assert!((buffer[4_799] - 0.001).abs() < 1e-6);
    }

    #[test]
    fn loud_signal_is_reduced() {
        let mut comp = Compressor::new(CompressorConfig::default(), SAMPLE_RATE);
        let mut buffer = vec![1.0; 48_000];
        comp.render(&mut buffer);

        // 0 dB in, threshold -24, ratio 4 → about -18 dB of reduction
        let gain_db = 20.0 * buffer[47_999].log10();
        assert!((gain_db + 18.0).abs() < 1.0, "gain {gain_db} dB");
    }

    #[test]
    fn knee_is_continuous() {
        let (threshold, ratio, knee) = (-24.0, 4.0, 30.0);
        let lower = threshold - knee / 2.0;
        let upper = threshold + knee / 2.0;
        assert!(soft_knee_reduction(lower, threshold, ratio, knee).abs() < 1e-5);
        let inside = soft_knee_reduction(upper - 1e-3, threshold, ratio, knee);
        let outside = soft_knee_reduction(upper + 1e-3, threshold, ratio, knee);
        assert!((inside - outside).abs() < 1e-2);
    }

    #[test]
    fn release_recovers_gain() {
        let mut comp = Compressor::new(CompressorConfig::default(), SAMPLE_RATE);
        let mut loud = vec![1.0; 9_600];
        comp.render(&mut loud);
        let squeezed = comp.current_gain();

        let mut silence = vec![0.0; 48_000];
        comp.render(&mut silence);
        assert!(comp.current_gain() > squeezed);
    }
}
