use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use crate::{
    graph::param::AudioParam,
    pitch::NoteId,
    synth::message::VoiceId,
    voices::VoiceProfile,
};

/// Control-thread record of a voice.
///
/// Mirrors the automation sent to the audio thread so the engine can read
/// the current gain (and send level) without asking the renderer.
#[derive(Debug, Clone)]
pub struct ActiveVoice {
    id: VoiceId,
    note: NoteId,
    velocity: f32,
    profile: Arc<VoiceProfile>,
    pub(crate) gain: AudioParam,
    pub(crate) send: Option<AudioParam>,
    pub(crate) stop_at: Option<f64>,
}

impl ActiveVoice {
    pub fn new(id: VoiceId, note: NoteId, velocity: f32, profile: Arc<VoiceProfile>) -> Self {
        let send = profile
            .aux()
            .iter()
            .find_map(|spec| spec.send_level())
            .map(AudioParam::new);

        Self {
            id,
            note,
            velocity,
            profile,
            gain: AudioParam::new(0.0),
            send,
            stop_at: None,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn note(&self) -> NoteId {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// The profile captured at note-on.
    pub fn profile(&self) -> &Arc<VoiceProfile> {
        &self.profile
    }

    pub fn gain(&self) -> &AudioParam {
        &self.gain
    }

    pub fn send(&self) -> Option<&AudioParam> {
        self.send.as_ref()
    }

    /// When the voice's oscillators are scheduled to stop, once released.
    pub fn stop_at(&self) -> Option<f64> {
        self.stop_at
    }
}

/// Sounding notes in insertion order, at most `capacity` of them.
///
/// The order queue and the map always hold the same set of notes; the front
/// of the queue is the next eviction candidate.
#[derive(Debug)]
pub struct VoiceTable {
    order: VecDeque<NoteId>,
    voices: HashMap<NoteId, ActiveVoice>,
    capacity: usize,
}

impl VoiceTable {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            voices: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= self.capacity
    }

    pub fn contains(&self, note: NoteId) -> bool {
        self.voices.contains_key(&note)
    }

    pub fn get(&self, note: NoteId) -> Option<&ActiveVoice> {
        self.voices.get(&note)
    }

    /// Least recently inserted note.
    pub fn oldest(&self) -> Option<NoteId> {
        self.order.front().copied()
    }

    /// Add `voice` as the newest entry.
    ///
    /// Callers make room first; inserting into a full table is a logic error.
    pub fn insert(&mut self, voice: ActiveVoice) {
        let note = voice.note();
        if self.voices.insert(note, voice).is_some() {
            self.order.retain(|n| *n != note);
        }
        self.order.push_back(note);
        debug_assert!(self.order.len() <= self.capacity);
        debug_assert_eq!(self.order.len(), self.voices.len());
    }

    pub fn remove(&mut self, note: NoteId) -> Option<ActiveVoice> {
        let voice = self.voices.remove(&note)?;
        self.order.retain(|n| *n != note);
        Some(voice)
    }

    /// Notes from oldest to newest.
    pub fn notes(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.order.iter().copied()
    }

    /// Empty the table, oldest first.
    pub fn drain(&mut self) -> Vec<ActiveVoice> {
        let order: Vec<NoteId> = self.order.drain(..).collect();
        order
            .into_iter()
            .filter_map(|note| self.voices.remove(&note))
            .collect()
    }
}
