use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::EngineConfig,
    error::Result,
    graph::clock::AudioClock,
    synth::{
        message::GraphCommand,
        renderer::{Discard, Renderer},
    },
};
#[cfg(feature = "rtrb")]
use crate::{error::KeybedError, synth::voice::VoiceGraph};

/// The engine's view of the audio graph: a clock to schedule against and a
/// way to send it commands.
pub trait GraphBackend {
    fn clock(&self) -> &AudioClock;

    /// Current audio-clock time in seconds.
    fn now(&self) -> f64 {
        self.clock().now()
    }

    fn sample_rate(&self) -> f32 {
        self.clock().sample_rate()
    }

    /// Deliver one engine operation's commands, all or nothing.
    fn submit(&mut self, commands: Vec<GraphCommand>) -> Result<()>;

    /// Free anything the audio side has handed back. Called from the engine
    /// on every event.
    fn collect_garbage(&mut self) {}
}

/// Real-time backend: lock-free rings to and from the audio callback.
#[cfg(feature = "rtrb")]
pub struct RingBackend {
    commands: Producer<GraphCommand>,
    retired: Consumer<Box<VoiceGraph>>,
    clock: AudioClock,
}

/// The renderer half that pairs with a [`RingBackend`].
#[cfg(feature = "rtrb")]
pub type RealtimeRenderer = Renderer<Consumer<GraphCommand>, Producer<Box<VoiceGraph>>>;

#[cfg(feature = "rtrb")]
impl RingBackend {
    /// Create the control-side backend and the renderer to move into the
    /// audio callback.
    pub fn realtime(config: &EngineConfig) -> (Self, RealtimeRenderer) {
        let clock = AudioClock::new(config.sample_rate);
        let (command_tx, command_rx) = RingBuffer::<GraphCommand>::new(config.command_capacity);
        let (retired_tx, retired_rx) = RingBuffer::<Box<VoiceGraph>>::new(config.command_capacity);

        let renderer = Renderer::new(command_rx, retired_tx, clock.clone(), &config.chain);
        let backend = Self {
            commands: command_tx,
            retired: retired_rx,
            clock,
        };
        (backend, renderer)
    }
}

#[cfg(feature = "rtrb")]
impl GraphBackend for RingBackend {
    fn clock(&self) -> &AudioClock {
        &self.clock
    }

    fn submit(&mut self, commands: Vec<GraphCommand>) -> Result<()> {
        let available = self.commands.slots();
        if commands.len() > available {
            return Err(KeybedError::CommandQueueFull {
                needed: commands.len(),
                available,
            });
        }
        let needed = commands.len();
        for command in commands {
            // Only this producer pushes, so the slots counted above stay free.
            if self.commands.push(command).is_err() {
                return Err(KeybedError::CommandQueueFull {
                    needed,
                    available: 0,
                });
            }
        }
        Ok(())
    }

    fn collect_garbage(&mut self) {
        while let Ok(voice) = self.retired.pop() {
            drop(voice);
        }
    }
}

/// Backend that renders in-process, on demand. Used for offline bounces and
/// for tests that need to hear the result.
pub struct OfflineBackend {
    renderer: Renderer<VecDeque<GraphCommand>, Discard>,
    clock: AudioClock,
}

impl OfflineBackend {
    pub fn new(config: &EngineConfig) -> Self {
        let clock = AudioClock::new(config.sample_rate);
        let renderer = Renderer::new(VecDeque::new(), Discard, clock.clone(), &config.chain);
        Self { renderer, clock }
    }

    /// Render the next `out.len()` samples.
    pub fn render(&mut self, out: &mut [f32]) {
        self.renderer.render_block(out);
    }

    pub fn render_seconds(&mut self, seconds: f64) -> Vec<f32> {
        let frames = (seconds * self.clock.sample_rate() as f64).round() as usize;
        let mut out = vec![0.0; frames];
        self.render(&mut out);
        out
    }

    pub fn renderer(&self) -> &Renderer<VecDeque<GraphCommand>, Discard> {
        &self.renderer
    }
}

impl GraphBackend for OfflineBackend {
    fn clock(&self) -> &AudioClock {
        &self.clock
    }

    fn submit(&mut self, commands: Vec<GraphCommand>) -> Result<()> {
        self.renderer.commands_mut().extend(commands);
        Ok(())
    }
}
