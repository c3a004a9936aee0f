use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::{graph::param::Automation, synth::voice::VoiceGraph};

/// Identifies one voice graph for its whole life, across retriggers of the
/// same note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u64);

/// Which automated parameter of a voice a command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamTarget {
    Gain,
    /// Wet level of the voice's delay send. Ignored by voices without one.
    SendWet,
}

/// Control → audio instruction. Every time is on the shared audio clock.
#[derive(Debug)]
pub enum GraphCommand {
    /// Add a fully built voice to the render set.
    Spawn(Box<VoiceGraph>),
    Automate {
        voice: VoiceId,
        param: ParamTarget,
        automation: Automation,
    },
    /// Stop every oscillator and modulator of the voice at `at`.
    Stop { voice: VoiceId, at: f64 },
}

impl GraphCommand {
    pub fn voice(&self) -> VoiceId {
        match self {
            GraphCommand::Spawn(graph) => graph.id(),
            GraphCommand::Automate { voice, .. } | GraphCommand::Stop { voice, .. } => *voice,
        }
    }
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<GraphCommand>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<GraphCommand> {
    fn pop(&mut self) -> Option<GraphCommand> {
        Consumer::pop(self).ok()
    }
}

impl CommandReceiver for VecDeque<GraphCommand> {
    fn pop(&mut self) -> Option<GraphCommand> {
        self.pop_front()
    }
}
