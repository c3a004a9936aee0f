#![allow(dead_code)]

use keybed::{
    graph::{AudioClock, Automation},
    synth::{GraphBackend, GraphCommand, ParamTarget, VoiceId},
    KeybedError, NoteId, Result,
};

/// Backend that keeps every submitted batch instead of rendering, with a
/// hand-driven clock.
pub struct RecordingBackend {
    clock: AudioClock,
    time: f64,
    pub batches: Vec<Vec<GraphCommand>>,
    /// When set, every submit fails as if the command ring were full.
    pub reject: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            clock: AudioClock::new(48_000.0),
            time: 0.0,
            batches: Vec::new(),
            reject: false,
        }
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn commands(&self) -> impl Iterator<Item = &GraphCommand> {
        self.batches.iter().flatten()
    }

    pub fn last_batch(&self) -> &[GraphCommand] {
        self.batches.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Id of the most recent voice spawned for `note`.
    pub fn spawned(&self, note: NoteId) -> Option<VoiceId> {
        self.commands()
            .filter_map(|command| match command {
                GraphCommand::Spawn(graph) if graph.note() == note => Some(graph.id()),
                _ => None,
            })
            .last()
    }

    pub fn spawn_count(&self) -> usize {
        self.commands()
            .filter(|command| matches!(command, GraphCommand::Spawn(_)))
            .count()
    }

    /// Every stop time sent to `voice`, in order.
    pub fn stops(&self, voice: VoiceId) -> Vec<f64> {
        self.commands()
            .filter_map(|command| match command {
                GraphCommand::Stop { voice: v, at } if *v == voice => Some(*at),
                _ => None,
            })
            .collect()
    }

    /// Automation sent to one parameter of `voice`, in order.
    pub fn automation(&self, voice: VoiceId, target: ParamTarget) -> Vec<Automation> {
        self.commands()
            .filter_map(|command| match command {
                GraphCommand::Automate {
                    voice: v,
                    param,
                    automation,
                } if *v == voice && *param == target => Some(*automation),
                _ => None,
            })
            .collect()
    }
}

impl GraphBackend for RecordingBackend {
    fn clock(&self) -> &AudioClock {
        &self.clock
    }

    fn now(&self) -> f64 {
        self.time
    }

    fn submit(&mut self, commands: Vec<GraphCommand>) -> Result<()> {
        if self.reject {
            return Err(KeybedError::CommandQueueFull {
                needed: commands.len(),
                available: 0,
            });
        }
        self.batches.push(commands);
        Ok(())
    }
}

pub fn note(name: &str) -> NoteId {
    name.parse().unwrap()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
