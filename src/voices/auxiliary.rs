//! Per-voice extras layered on top of the primary oscillator.
//!
//! A profile describes its extras declaratively with [`AuxSpec`]. At note-on
//! each spec is built into an [`AuxNode`] that lives inside the voice graph
//! and is torn down with it. Every node answers `stop_at`, so teardown never
//! needs to know which kind it holds.

use rand::Rng;

use crate::{
    dsp::oscillator::Waveform,
    error::Result,
    graph::{
        delay::DelayNode,
        lfo::{block_average, LfoNode},
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
        param::AudioParam,
    },
    CONTROL_BLOCK,
};

/// What a vibrato LFO moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibratoTarget {
    /// Depth in Hz, added to the voice filter cutoff.
    FilterCutoff,
    /// Depth in cents, added to the primary oscillator detune.
    Pitch,
}

/// What the voice knows about the note when building its extras.
#[derive(Debug, Clone, Copy)]
pub struct AuxContext {
    pub frequency: f32,
    pub velocity: f32,
    pub sample_rate: f32,
    pub now: f64,
}

#[derive(Debug, Clone)]
pub enum AuxSpec {
    /// Random detune on the primary plus a second oscillator a few cents away.
    DetunedPair {
        /// Primary detune is drawn from ±`jitter_cents`.
        jitter_cents: f32,
        waveform: Waveform,
        detune_cents: f32,
        level: f32,
    },
    /// Extra partials at integer (or any) multiples of the note frequency.
    ///
    /// Partial `ratio` sounds at `velocity * level / ratio`.
    HarmonicStack {
        waveform: Waveform,
        ratios: Vec<f32>,
        level: f32,
    },
    /// LFO at `rate_hz` plus up to `rate_jitter_hz`, scaled by `depth`.
    Vibrato {
        rate_hz: f32,
        rate_jitter_hz: f32,
        depth: f32,
        target: VibratoTarget,
    },
    /// Post-gain feedback echo mixed back onto the bus at `wet`.
    DelaySend {
        delay_seconds: f32,
        feedback: f32,
        wet: f32,
    },
}

impl AuxSpec {
    /// Build the runtime node for one note. May adjust the primary oscillator.
    pub fn build<R: Rng + ?Sized>(
        &self,
        primary: &mut OscNode,
        ctx: &AuxContext,
        rng: &mut R,
    ) -> Result<AuxNode> {
        let node = match self {
            AuxSpec::DetunedPair {
                jitter_cents,
                waveform,
                detune_cents,
                level,
            } => {
                let jitter = (rng.random::<f32>() * 2.0 - 1.0) * jitter_cents;
                primary.set_detune(primary.detune() + jitter);

                let mut osc = OscNode::from_waveform(waveform)?.with_detune(*detune_cents);
                osc.start(ctx.now);
                AuxNode::DetunedPair { osc, level: *level }
            }
            AuxSpec::HarmonicStack {
                waveform,
                ratios,
                level,
            } => {
                let partials = ratios
                    .iter()
                    .filter(|ratio| **ratio > 0.0)
                    .map(|&ratio| -> Result<(OscNode, f32)> {
                        let mut osc =
                            OscNode::from_waveform(waveform)?.with_frequency(ctx.frequency * ratio);
                        osc.start(ctx.now);
                        Ok((osc, ctx.velocity * level / ratio))
                    })
                    .collect::<Result<Vec<_>>>()?;
                AuxNode::HarmonicStack { partials }
            }
            AuxSpec::Vibrato {
                rate_hz,
                rate_jitter_hz,
                depth,
                target,
            } => {
                let rate = rate_hz + rng.random::<f32>() * rate_jitter_hz;
                AuxNode::Vibrato {
                    lfo: LfoNode::sine(rate),
                    depth: *depth,
                    target: *target,
                    buffer: vec![0.0; CONTROL_BLOCK],
                    stop: None,
                }
            }
            AuxSpec::DelaySend {
                delay_seconds,
                feedback,
                wet,
            } => AuxNode::DelaySend {
                delay: DelayNode::new(*delay_seconds, *feedback, ctx.sample_rate),
                wet: AudioParam::new(*wet),
                buffer: vec![0.0; CONTROL_BLOCK],
                stop: None,
            },
        };
        Ok(node)
    }

    /// Initial wet level, for delay sends.
    pub fn send_level(&self) -> Option<f32> {
        match self {
            AuxSpec::DelaySend { wet, .. } => Some(*wet),
            _ => None,
        }
    }
}

/// Runtime side of an [`AuxSpec`], owned by one voice graph.
pub enum AuxNode {
    DetunedPair {
        osc: OscNode,
        level: f32,
    },
    HarmonicStack {
        partials: Vec<(OscNode, f32)>,
    },
    Vibrato {
        lfo: LfoNode,
        depth: f32,
        target: VibratoTarget,
        buffer: Vec<f32>,
        stop: Option<f64>,
    },
    DelaySend {
        delay: DelayNode,
        wet: AudioParam,
        buffer: Vec<f32>,
        stop: Option<f64>,
    },
}

fn earliest(current: Option<f64>, at: f64) -> Option<f64> {
    Some(current.map_or(at, |existing| existing.min(at)))
}

impl AuxNode {
    /// Schedule this node to fall silent at `at`.
    pub fn stop_at(&mut self, at: f64) {
        match self {
            AuxNode::DetunedPair { osc, .. } => osc.stop_at(at),
            AuxNode::HarmonicStack { partials } => {
                partials.iter_mut().for_each(|(osc, _)| osc.stop_at(at))
            }
            AuxNode::Vibrato { stop, .. } | AuxNode::DelaySend { stop, .. } => {
                *stop = earliest(*stop, at)
            }
        }
    }

    /// Add any oscillator output into the pre-filter `out`.
    pub fn add_source(&mut self, out: &mut [f32], scratch: &mut [f32], ctx: &RenderCtx) {
        let scratch = &mut scratch[..out.len()];
        match self {
            AuxNode::DetunedPair { osc, level } => {
                osc.render_block(scratch, ctx);
                for (o, s) in out.iter_mut().zip(scratch.iter()) {
                    *o += s * *level;
                }
            }
            AuxNode::HarmonicStack { partials } => {
                for (osc, level) in partials.iter_mut() {
                    osc.render_block(scratch, ctx);
                    for (o, s) in out.iter_mut().zip(scratch.iter()) {
                        *o += s * *level;
                    }
                }
            }
            AuxNode::Vibrato { .. } | AuxNode::DelaySend { .. } => {}
        }
    }

    /// Block-rate modulation amount for this block, if this node is a vibrato.
    pub fn modulation(&mut self, len: usize, ctx: &RenderCtx) -> Option<(VibratoTarget, f32)> {
        match self {
            AuxNode::Vibrato {
                lfo,
                depth,
                target,
                buffer,
                stop,
            } => {
                if stop.is_some_and(|stop| ctx.time >= stop) {
                    return Some((*target, 0.0));
                }
                let len = len.min(buffer.len());
                lfo.render_block(&mut buffer[..len], ctx);
                Some((*target, block_average(&buffer[..len]) * *depth))
            }
            _ => None,
        }
    }

    /// Tap the post-gain signal in `out` and add the echo back into it.
    pub fn add_send(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if let AuxNode::DelaySend {
            delay,
            wet,
            buffer,
            stop,
        } = self
        {
            let tap = &mut buffer[..out.len()];
            tap.copy_from_slice(out);
            delay.render_block(tap, ctx);

            for (i, (o, echo)) in out.iter_mut().zip(tap.iter()).enumerate() {
                let time = ctx.sample_time(i);
                if stop.is_some_and(|stop| time >= stop) {
                    break;
                }
                *o += echo * wet.value_at(time);
            }
        }
    }

    /// The wet-level timeline of a delay send.
    pub fn send_mut(&mut self) -> Option<&mut AudioParam> {
        match self {
            AuxNode::DelaySend { wet, .. } => Some(wet),
            _ => None,
        }
    }

    pub fn send(&self) -> Option<&AudioParam> {
        match self {
            AuxNode::DelaySend { wet, .. } => Some(wet),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuxNode::DetunedPair { .. } => "detuned-pair",
            AuxNode::HarmonicStack { .. } => "harmonic-stack",
            AuxNode::Vibrato { .. } => "vibrato",
            AuxNode::DelaySend { .. } => "delay-send",
        }
    }
}
