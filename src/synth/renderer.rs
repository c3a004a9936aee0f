use log::trace;

#[cfg(feature = "rtrb")]
use rtrb::Producer;

use crate::{
    config::ChainConfig,
    graph::{
        chain::SignalChain,
        clock::AudioClock,
        node::{GraphNode, RenderCtx},
    },
    synth::{
        message::{CommandReceiver, GraphCommand},
        voice::VoiceGraph,
    },
    MAX_BLOCK_SIZE, MAX_POLYPHONY, MAX_RELEASING,
};

/// Sounding plus releasing voices, doubled for force-stopped graphs that
/// have not been retired yet.
const VOICE_GRAPH_CAPACITY: usize = (MAX_POLYPHONY + MAX_RELEASING) * 2;

/// Where the renderer sends voice graphs it has finished with.
///
/// The real-time implementation hands them back to the control thread so the
/// audio callback never frees memory.
pub trait Retire {
    fn retire(&mut self, voice: Box<VoiceGraph>);
}

/// Drops retired voices in place. For offline rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct Discard;

impl Retire for Discard {
    fn retire(&mut self, _voice: Box<VoiceGraph>) {}
}

#[cfg(feature = "rtrb")]
impl Retire for Producer<Box<VoiceGraph>> {
    fn retire(&mut self, voice: Box<VoiceGraph>) {
        // With the return ring full the voice is dropped here instead.
        let _ = self.push(voice);
    }
}

/// Audio-thread half of the engine.
///
/// Each block: apply pending commands, render every live voice onto the bus,
/// run the bus through the signal chain, advance the clock, retire voices
/// whose stop time has passed.
pub struct Renderer<R: CommandReceiver, T: Retire> {
    commands: R,
    retired: T,
    voices: Vec<Box<VoiceGraph>>,
    chain: SignalChain,
    clock: AudioClock,
    voice_buffer: Vec<f32>,
    mono_buffer: Vec<f32>,
}

impl<R: CommandReceiver, T: Retire> Renderer<R, T> {
    pub fn new(commands: R, retired: T, clock: AudioClock, chain: &ChainConfig) -> Self {
        let sample_rate = clock.sample_rate();
        Self {
            commands,
            retired,
            voices: Vec::with_capacity(VOICE_GRAPH_CAPACITY),
            chain: SignalChain::new(chain, sample_rate),
            clock,
            voice_buffer: vec![0.0; MAX_BLOCK_SIZE],
            mono_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn clock(&self) -> &AudioClock {
        &self.clock
    }

    /// Voice graphs currently rendering, releasing ones included.
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub(crate) fn commands_mut(&mut self) -> &mut R {
        &mut self.commands
    }

    fn apply_commands(&mut self) {
        while let Some(command) = self.commands.pop() {
            match command {
                GraphCommand::Spawn(voice) => self.voices.push(voice),
                GraphCommand::Automate {
                    voice,
                    param,
                    automation,
                } => {
                    if let Some(graph) = self.voices.iter_mut().find(|v| v.id() == voice) {
                        graph.automate(param, automation);
                    }
                }
                GraphCommand::Stop { voice, at } => {
                    if let Some(graph) = self.voices.iter_mut().find(|v| v.id() == voice) {
                        graph.stop(at);
                    }
                }
            }
        }
    }

    fn retire_finished(&mut self) {
        let mut index = 0;
        while index < self.voices.len() {
            if self.voices[index].is_active() {
                index += 1;
            } else {
                let voice = self.voices.swap_remove(index);
                trace!("retiring voice {:?} ({})", voice.id(), voice.note());
                self.retired.retire(voice);
            }
        }
    }

    /// Render mono output into `out`, any length.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.apply_commands();

        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let len = chunk.len();
            let ctx = RenderCtx::from_freq(self.clock.sample_rate(), 0.0, 0.0).at_time(self.clock.now());

            chunk.fill(0.0);
            for voice in self.voices.iter_mut() {
                let buffer = &mut self.voice_buffer[..len];
                voice.render_block(buffer, &ctx);
                for (o, v) in chunk.iter_mut().zip(buffer.iter()) {
                    *o += v;
                }
            }

            self.chain.process(chunk, &ctx);
            self.clock.advance(len);
            self.retire_finished();
        }
    }

    /// Render into an interleaved device buffer, the same signal on every channel.
    pub fn render_interleaved(&mut self, data: &mut [f32], channels: usize) {
        let channels = channels.max(1);
        for frames in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let len = frames.len() / channels;
            let mut mono = std::mem::take(&mut self.mono_buffer);
            self.render_block(&mut mono[..len]);

            for (frame, sample) in frames.chunks_mut(channels).zip(mono.iter()) {
                frame.fill(*sample);
            }
            self.mono_buffer = mono;
        }
    }

    /// Drop every voice and clear the signal chain.
    pub fn reset(&mut self) {
        for voice in self.voices.drain(..) {
            self.retired.retire(voice);
        }
        self.chain.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;
    use crate::{
        graph::param::Automation,
        synth::message::{ParamTarget, VoiceId},
        voices,
    };

    const SAMPLE_RATE: f32 = 48_000.0;

    fn renderer() -> Renderer<VecDeque<GraphCommand>, Discard> {
        Renderer::new(
            VecDeque::new(),
            Discard,
            AudioClock::new(SAMPLE_RATE),
            &ChainConfig::default(),
        )
    }

    fn spawn(renderer: &mut Renderer<VecDeque<GraphCommand>, Discard>, id: u64) {
        let mut rng = SmallRng::seed_from_u64(id);
        let graph = VoiceGraph::build(
            VoiceId(id),
            "A4".parse().unwrap(),
            0.5,
            &voices::piano(),
            renderer.clock().now(),
            SAMPLE_RATE,
            &mut rng,
        )
        .unwrap();
        let commands = renderer.commands_mut();
        commands.push_back(GraphCommand::Spawn(Box::new(graph)));
        commands.push_back(GraphCommand::Automate {
            voice: VoiceId(id),
            param: ParamTarget::Gain,
            automation: Automation::SetValueAtTime {
                value: 0.5,
                time: 0.0,
            },
        });
    }

    #[test]
    fn clock_advances_by_rendered_frames() {
        let mut renderer = renderer();
        let mut out = vec![0.0; 4_800];
        renderer.render_block(&mut out);
        assert_eq!(renderer.clock().frames(), 4_800);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn spawned_voice_is_heard() {
        let mut renderer = renderer();
        spawn(&mut renderer, 1);

        let mut out = vec![0.0; 4_800];
        renderer.render_block(&mut out);
        assert_eq!(renderer.voice_count(), 1);
        assert!(out.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn stopped_voice_is_retired() {
        let mut renderer = renderer();
        spawn(&mut renderer, 1);
        renderer.commands_mut().push_back(GraphCommand::Stop {
            voice: VoiceId(1),
            at: 0.01,
        });

        let mut out = vec![0.0; 960];
        renderer.render_block(&mut out);
        assert_eq!(renderer.voice_count(), 0);
    }

    #[test]
    fn commands_for_unknown_voices_are_ignored() {
        let mut renderer = renderer();
        renderer.commands_mut().push_back(GraphCommand::Stop {
            voice: VoiceId(99),
            at: 0.0,
        });
        let mut out = vec![0.0; 64];
        renderer.render_block(&mut out);
        assert_eq!(renderer.voice_count(), 0);
    }

    #[test]
    fn interleaved_copies_to_every_channel() {
        let mut renderer = renderer();
        spawn(&mut renderer, 1);

        let mut data = vec![0.0; 2 * 3_000];
        renderer.render_interleaved(&mut data, 2);
        assert_eq!(renderer.clock().frames(), 3_000);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(data.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn reset_drops_voices() {
        let mut renderer = renderer();
        spawn(&mut renderer, 1);
        spawn(&mut renderer, 2);
        renderer.render_block(&mut [0.0; 64]);
        assert_eq!(renderer.voice_count(), 2);

        renderer.reset();
        assert_eq!(renderer.voice_count(), 0);
    }
}
