use std::fmt;

use rand::Rng;

use crate::{
    error::Result,
    graph::{
        filter::{FilterNode, FilterParam},
        node::{GraphNode, Modulatable, RenderCtx},
        oscillator::{OscNode, OscParam},
        param::{AudioParam, Automation},
    },
    pitch::NoteId,
    synth::message::{ParamTarget, VoiceId},
    voices::{AuxContext, AuxNode, VibratoTarget, VoiceProfile},
    CONTROL_BLOCK,
};

/// Everything that sounds for one note, as rendered on the audio thread.
///
/// ```text
///   primary osc ─┐
///   aux oscs ────┴─► filter ──► gain (AudioParam) ──┬──► out
///                      ▲                            │
///                  vibrato                   delay send (wet) ──► out
/// ```
///
/// Built complete on the control thread, then moved across in a
/// `GraphCommand::Spawn`. The graph starts silent: its gain param holds no
/// events until the engine's note-on automation arrives.
pub struct VoiceGraph {
    id: VoiceId,
    note: NoteId,
    frequency: f32,
    velocity: f32,
    primary: OscNode,
    filter: FilterNode,
    gain: AudioParam,
    aux: Vec<AuxNode>,
    stop_at: Option<f64>,
    rendered_until: f64,
    scratch: Vec<f32>,
}

impl VoiceGraph {
    /// Build every node for `note` from `profile`, oscillators starting at `now`.
    ///
    /// Fails without side effects if any oscillator (including auxiliary
    /// ones) cannot be built.
    pub fn build<R: Rng + ?Sized>(
        id: VoiceId,
        note: NoteId,
        velocity: f32,
        profile: &VoiceProfile,
        now: f64,
        sample_rate: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let frequency = note.frequency();

        let mut primary = OscNode::from_waveform(profile.waveform())?;
        primary.start(now);

        let settings = profile.filter();
        let filter = FilterNode::new(settings.kind, settings.cutoff_hz, settings.q);

        let ctx = AuxContext {
            frequency,
            velocity,
            sample_rate,
            now,
        };
        let aux = profile
            .aux()
            .iter()
            .map(|spec| spec.build(&mut primary, &ctx, &mut *rng))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            id,
            note,
            frequency,
            velocity,
            primary,
            filter,
            gain: AudioParam::new(0.0),
            aux,
            stop_at: None,
            rendered_until: now,
            scratch: vec![0.0; CONTROL_BLOCK],
        })
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn note(&self) -> NoteId {
        self.note
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_at
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }

    pub fn send(&self) -> Option<&AudioParam> {
        self.aux.iter().find_map(AuxNode::send)
    }

    pub fn aux(&self) -> &[AuxNode] {
        &self.aux
    }

    pub fn automate(&mut self, param: ParamTarget, automation: Automation) {
        match param {
            ParamTarget::Gain => self.gain.apply(automation),
            ParamTarget::SendWet => {
                if let Some(wet) = self.aux.iter_mut().find_map(AuxNode::send_mut) {
                    wet.apply(automation);
                }
            }
        }
    }

    /// Stop every oscillator and modulator at `at`. An earlier stop wins.
    pub fn stop(&mut self, at: f64) {
        self.stop_at = Some(self.stop_at.map_or(at, |existing| existing.min(at)));
        self.primary.stop_at(at);
        for aux in self.aux.iter_mut() {
            aux.stop_at(at);
        }
    }

    fn apply_vibrato(&mut self, len: usize, ctx: &RenderCtx) {
        for aux in self.aux.iter_mut() {
            let Some((target, amount)) = aux.modulation(len, ctx) else {
                continue;
            };
            match target {
                VibratoTarget::FilterCutoff => {
                    let base = self.filter.get_param(FilterParam::Cutoff);
                    self.filter.apply_modulation(FilterParam::Cutoff, base, amount);
                }
                VibratoTarget::Pitch => {
                    let base = self.primary.get_param(OscParam::Detune);
                    self.primary.apply_modulation(OscParam::Detune, base, amount);
                }
            }
        }
    }
}

impl GraphNode for VoiceGraph {
    /// Overwrites `out` with this voice's contribution to the bus.
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.gain.prune_before(ctx.time);
        if let Some(wet) = self.aux.iter_mut().find_map(AuxNode::send_mut) {
            wet.prune_before(ctx.time);
        }

        let voice_ctx = RenderCtx {
            frequency: self.frequency,
            velocity: self.velocity,
            ..*ctx
        };

        for (index, chunk) in out.chunks_mut(CONTROL_BLOCK).enumerate() {
            let len = chunk.len();
            let block_ctx = voice_ctx.at_time(voice_ctx.sample_time(index * CONTROL_BLOCK));

            self.apply_vibrato(len, &block_ctx);

            self.primary.render_block(chunk, &block_ctx);
            for aux in self.aux.iter_mut() {
                aux.add_source(chunk, &mut self.scratch, &block_ctx);
            }

            self.filter.render_block(chunk, &block_ctx);

            let envelope = &mut self.scratch[..len];
            self.gain.fill(envelope, block_ctx.time, block_ctx.sample_rate);
            for (sample, gain) in chunk.iter_mut().zip(envelope.iter()) {
                *sample *= gain;
            }

            for aux in self.aux.iter_mut() {
                aux.add_send(chunk, &block_ctx);
            }
        }

        self.rendered_until = ctx.sample_time(out.len());
    }

    fn is_active(&self) -> bool {
        self.stop_at.is_none_or(|stop| self.rendered_until < stop)
    }
}

impl fmt::Debug for VoiceGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoiceGraph")
            .field("id", &self.id)
            .field("note", &self.note)
            .field("velocity", &self.velocity)
            .field("aux", &self.aux.iter().map(AuxNode::kind).collect::<Vec<_>>())
            .field("stop_at", &self.stop_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dsp::oscillator::{PeriodicWave, Waveform},
        voices::{self, AuxSpec},
    };
    use rand::{rngs::SmallRng, SeedableRng};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn c4() -> NoteId {
        "C4".parse().unwrap()
    }

    fn build(profile: &VoiceProfile) -> Result<VoiceGraph> {
        let mut rng = SmallRng::seed_from_u64(42);
        VoiceGraph::build(VoiceId(1), c4(), 0.5, profile, 0.0, SAMPLE_RATE, &mut rng)
    }

    fn peak(buffer: &[f32]) -> f32 {
        buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn silent_until_automated() {
        let mut voice = build(&voices::piano()).unwrap();
        let mut out = vec![1.0; 256];
        voice.render_block(&mut out, &RenderCtx::from_freq(SAMPLE_RATE, 0.0, 0.0));
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn sounds_once_gain_is_set() {
        let mut voice = build(&voices::organ()).unwrap();
        voice.automate(
            ParamTarget::Gain,
            Automation::SetValueAtTime {
                value: 0.5,
                time: 0.0,
            },
        );
        let mut out = vec![0.0; 2_048];
        voice.render_block(&mut out, &RenderCtx::from_freq(SAMPLE_RATE, 0.0, 0.0));
        assert!(peak(&out) > 0.1);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn stop_silences_and_deactivates() {
        let mut voice = build(&voices::synth()).unwrap();
        voice.automate(
            ParamTarget::Gain,
            Automation::SetValueAtTime {
                value: 0.5,
                time: 0.0,
            },
        );
        voice.stop(0.01);
        assert!(voice.is_active());

        let mut out = vec![0.0; 960];
        voice.render_block(&mut out, &RenderCtx::from_freq(SAMPLE_RATE, 0.0, 0.0));

        // oscillators are silent after 480 samples; the filter ringing dies away
        assert!(peak(&out[900..]) < 0.01);
        assert!(!voice.is_active());
    }

    #[test]
    fn send_automation_reaches_delay() {
        let mut voice = build(&voices::cosmic()).unwrap();
        assert_eq!(voice.send().map(|wet| wet.value_at(0.0)), Some(1.0));

        voice.automate(
            ParamTarget::SendWet,
            Automation::SetValueAtTime {
                value: 0.0,
                time: 0.0,
            },
        );
        assert_eq!(voice.send().map(|wet| wet.value_at(0.1)), Some(0.0));

        // voices without a send ignore it
        let mut piano = build(&voices::piano()).unwrap();
        piano.automate(
            ParamTarget::SendWet,
            Automation::SetValueAtTime {
                value: 0.0,
                time: 0.0,
            },
        );
        assert!(piano.send().is_none());
    }

    #[test]
    fn bad_aux_fails_whole_build() {
        let broken = VoiceProfile::builder("broken", Waveform::Sine)
            .aux(AuxSpec::HarmonicStack {
                waveform: Waveform::Custom(PeriodicWave::new(vec![0.0, 1.0], vec![0.0])),
                ratios: vec![2.0],
                level: 0.5,
            })
            .build();
        assert!(build(&broken).is_err());
    }

    #[test]
    fn debug_lists_aux_kinds() {
        let voice = build(&voices::cosmic()).unwrap();
        let text = format!("{voice:?}");
        assert!(text.contains("vibrato") && text.contains("delay-send"));
    }
}
