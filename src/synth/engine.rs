use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use log::{debug, warn};
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    config::EngineConfig,
    error::{KeybedError, Result},
    graph::param::Automation,
    pitch::NoteId,
    synth::{
        backend::GraphBackend,
        message::{GraphCommand, ParamTarget, VoiceId},
        table::{ActiveVoice, VoiceTable},
        voice::VoiceGraph,
    },
    voices::{VoiceProfile, VoiceRegistry},
    MAX_RELEASING, MIN_TIME,
};

/*
Polyphony Engine
================

Turns "key down" / "key up" into scheduled sound. Nothing here renders
audio: every decision becomes automation on the shared audio clock, sent to
the renderer as a batch of `GraphCommand`s.

Note lifetime
-------------

    absent ──start_note──► sounding ──stop_note──► releasing ──(stop time)──► absent
                              │                        │
                              └──── forced stop ───────┴──► absent (immediately)

Gain envelope for velocity v, profile peak scale p:

    gain
     v·p ┤     ●
         │    ╱ ╲
   S·v·p ┤   ╱   ●━━━━━━━━━━━━━━━━━●  captured at release
         │  ╱                        ╲
    1e-4 ┤ ●                          ●━━ stop at release end + tail
         └─┴──A──┴─D─┴──── held ─────┴──R──┴──► time
         now                        stop_note

Release always starts from the value the gain has at that instant, so a
note released mid-attack fades from wherever it got to instead of jumping.

Polyphony
---------

At most `max_polyphony` notes are sounding. A new note arriving at a full
table steals the OLDEST sounding note (insertion order, not age of last
touch). A stolen voice gets a forced stop: pending automation cancelled,
gain 0, oscillators stopped, all at the current instant.

Releasing voices do not count against the limit; they leave on their own
when the release ends. Pressing a note again while it is still releasing
force-stops the old tail so one key never owns two voices.

Atomicity
---------

Every operation builds its full command batch first, submits it in one go,
and only then updates the table. If building the voice fails (for instance
a custom wave table that cannot be rendered) or the backend rejects the
batch, the engine state is unchanged.
*/

const SILENCE: f32 = 1e-4;

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0x6b65_7962_6564)
}

/// Apply `automation` to the control-side mirror and queue it for the audio side.
fn automate(
    voice: &mut ActiveVoice,
    param: ParamTarget,
    automation: Automation,
    commands: &mut Vec<GraphCommand>,
) {
    match param {
        ParamTarget::Gain => voice.gain.apply(automation),
        ParamTarget::SendWet => match voice.send.as_mut() {
            Some(send) => send.apply(automation),
            None => return,
        },
    }
    commands.push(GraphCommand::Automate {
        voice: voice.id(),
        param,
        automation,
    });
}

/// Silence `voice` right now, throwing away whatever was scheduled.
fn force_stop(voice: &mut ActiveVoice, now: f64, commands: &mut Vec<GraphCommand>) {
    for param in [ParamTarget::Gain, ParamTarget::SendWet] {
        automate(
            voice,
            param,
            Automation::CancelScheduledValues { time: now },
            commands,
        );
        automate(
            voice,
            param,
            Automation::SetValueAtTime {
                value: 0.0,
                time: now,
            },
            commands,
        );
    }
    voice.stop_at = Some(now);
    commands.push(GraphCommand::Stop {
        voice: voice.id(),
        at: now,
    });
}

/// Attack to velocity peak, decay to sustain, then hold.
fn schedule_attack(voice: &mut ActiveVoice, now: f64, commands: &mut Vec<GraphCommand>) {
    let envelope = voice.profile().envelope();
    let peak = voice.velocity() * voice.profile().peak_scale();
    let attack = envelope.attack.max(MIN_TIME) as f64;
    let decay = envelope.decay.max(MIN_TIME) as f64;

    let steps = [
        Automation::CancelScheduledValues { time: now },
        Automation::SetValueAtTime {
            value: 0.0,
            time: now,
        },
        Automation::LinearRampToValueAtTime {
            value: peak,
            time: now + attack,
        },
        Automation::LinearRampToValueAtTime {
            value: envelope.sustain * peak,
            time: now + attack + decay,
        },
    ];
    for step in steps {
        automate(voice, ParamTarget::Gain, step, commands);
    }
}

pub struct PolyphonyEngine<B: GraphBackend> {
    backend: B,
    registry: VoiceRegistry,
    active_profile: Arc<VoiceProfile>,
    table: VoiceTable,
    /// Released notes whose tails are still sounding, keyed by note.
    tails: HashMap<NoteId, ActiveVoice>,
    config: EngineConfig,
    rng: SmallRng,
    next_id: u64,
}

impl<B: GraphBackend> PolyphonyEngine<B> {
    /// Fails only if `registry` is empty. An unknown `config.default_voice`
    /// falls back to the registry's first profile.
    pub fn new(backend: B, registry: VoiceRegistry, config: EngineConfig) -> Result<Self> {
        // the field is public and deserializable, so re-apply the bound here
        let voices = config.max_polyphony;
        let config = config.with_max_polyphony(voices);

        let active_profile = match registry.lookup(&config.default_voice) {
            Ok(profile) => profile,
            Err(err) => {
                let fallback = registry.first().ok_or(err)?;
                warn!(
                    "default voice `{}` not registered, using `{}`",
                    config.default_voice,
                    fallback.name()
                );
                fallback
            }
        };

        let rng = SmallRng::seed_from_u64(config.seed.unwrap_or_else(clock_seed));

        Ok(Self {
            backend,
            registry,
            active_profile,
            table: VoiceTable::new(config.max_polyphony),
            tails: HashMap::new(),
            config,
            rng,
            next_id: 0,
        })
    }

    /// Engine with the stock voice catalogue.
    pub fn with_standard_voices(backend: B, config: EngineConfig) -> Result<Self> {
        Self::new(backend, VoiceRegistry::standard(), config)
    }

    /// Begin sounding `note`.
    ///
    /// Velocity is clamped to 0.0-1.0; NaN is rejected. Retriggers a note
    /// that is already sounding and steals the oldest note when the table
    /// is full.
    pub fn start_note(&mut self, note: NoteId, velocity: f32) -> Result<()> {
        if velocity.is_nan() {
            warn!("rejecting note-on for {note}: velocity is NaN");
            return Err(KeybedError::InvalidVelocity(velocity));
        }
        let velocity = velocity.clamp(0.0, 1.0);
        self.maintain();

        let now = self.backend.now();
        let profile = Arc::clone(&self.active_profile);
        let id = VoiceId(self.next_id);

        let graph = VoiceGraph::build(
            id,
            note,
            velocity,
            &profile,
            now,
            self.backend.sample_rate(),
            &mut self.rng,
        )
        .inspect_err(|err| warn!("note-on for {note} failed: {err}"))?;
        self.next_id += 1;

        let mut commands = Vec::with_capacity(16);

        let retrigger = match self.table.get(note).or_else(|| self.tails.get(&note)) {
            Some(existing) => {
                let mut existing = existing.clone();
                force_stop(&mut existing, now, &mut commands);
                true
            }
            None => false,
        };

        let victim = if !self.table.contains(note) && self.table.is_full() {
            self.table.oldest()
        } else {
            None
        };
        if let Some(oldest) = victim.and_then(|n| self.table.get(n)) {
            let mut oldest = oldest.clone();
            force_stop(&mut oldest, now, &mut commands);
        }

        let mut voice = ActiveVoice::new(id, note, velocity, Arc::clone(&profile));
        commands.push(GraphCommand::Spawn(Box::new(graph)));
        schedule_attack(&mut voice, now, &mut commands);

        self.backend
            .submit(commands)
            .inspect_err(|err| warn!("note-on for {note} dropped: {err}"))?;

        if retrigger {
            debug!("retrigger {note}");
            self.table.remove(note);
            self.tails.remove(&note);
        }
        if let Some(oldest) = victim {
            debug!("stealing {oldest} for {note}");
            self.table.remove(oldest);
        }
        debug!("note on {note} ({}, velocity {velocity:.2})", profile.name());
        self.table.insert(voice);
        Ok(())
    }

    /// Release `note`. Does nothing if it is not sounding.
    ///
    /// With [`MAX_RELEASING`] tails already ringing, the one due to end
    /// first is force-stopped.
    pub fn stop_note(&mut self, note: NoteId) -> Result<()> {
        self.maintain();
        let Some(voice) = self.table.get(note) else {
            return Ok(());
        };
        let mut voice = voice.clone();

        let now = self.backend.now();
        let release = voice.profile().envelope().release.max(MIN_TIME) as f64;
        let mut commands = Vec::with_capacity(8);

        let current = voice.gain().value_at(now);
        let fade = [
            Automation::CancelScheduledValues { time: now },
            Automation::SetValueAtTime {
                value: current,
                time: now,
            },
            Automation::LinearRampToValueAtTime {
                value: SILENCE,
                time: now + release,
            },
        ];
        for step in fade {
            automate(&mut voice, ParamTarget::Gain, step, &mut commands);
        }

        if let Some(wet) = voice.send().map(|send| send.value_at(now)) {
            let fade = [
                Automation::CancelScheduledValues { time: now },
                Automation::SetValueAtTime {
                    value: wet,
                    time: now,
                },
                Automation::LinearRampToValueAtTime {
                    value: 0.0,
                    time: now + release,
                },
            ];
            for step in fade {
                automate(&mut voice, ParamTarget::SendWet, step, &mut commands);
            }
        }

        let stop_at = now + release + self.config.release_tail;
        voice.stop_at = Some(stop_at);
        commands.push(GraphCommand::Stop {
            voice: voice.id(),
            at: stop_at,
        });

        let cut = if self.tails.len() >= MAX_RELEASING {
            self.shortest_tail()
        } else {
            None
        };
        if let Some(tail) = cut.and_then(|n| self.tails.get(&n)) {
            let mut tail = tail.clone();
            force_stop(&mut tail, now, &mut commands);
        }

        self.backend
            .submit(commands)
            .inspect_err(|err| warn!("note-off for {note} dropped: {err}"))?;

        if let Some(tail) = cut {
            debug!("cutting release tail of {tail}");
            self.tails.remove(&tail);
        }
        debug!("note off {note}, stopping at {stop_at:.3}s");
        self.table.remove(note);
        self.tails.insert(note, voice);
        Ok(())
    }

    /// Release every sounding note, oldest first.
    ///
    /// Keeps going past a failed release and reports the last error.
    pub fn all_notes_off(&mut self) -> Result<()> {
        let notes: Vec<NoteId> = self.table.notes().collect();
        let mut result = Ok(());
        for note in notes {
            if let Err(err) = self.stop_note(note) {
                result = Err(err);
            }
        }
        result
    }

    /// Force-stop every voice, release tails included.
    pub fn panic(&mut self) -> Result<()> {
        let now = self.backend.now();
        let mut commands = Vec::new();

        let voices = self
            .table
            .notes()
            .filter_map(|note| self.table.get(note))
            .chain(self.tails.values());
        for voice in voices {
            let mut voice = voice.clone();
            force_stop(&mut voice, now, &mut commands);
        }

        self.backend
            .submit(commands)
            .inspect_err(|err| warn!("panic dropped: {err}"))?;

        debug!("panic: silenced {} voices", self.table.len() + self.tails.len());
        self.table.drain();
        self.tails.clear();
        Ok(())
    }

    /// Choose the profile for future notes. Sounding notes keep theirs.
    pub fn set_active_voice_profile(&mut self, name: &str) -> Result<()> {
        let profile = self
            .registry
            .lookup(name)
            .inspect_err(|err| warn!("{err}"))?;
        debug!("voice profile -> {name}");
        self.active_profile = profile;
        Ok(())
    }

    pub fn voice_profile_names(&self) -> Vec<&str> {
        self.registry.names()
    }

    pub fn active_profile(&self) -> &VoiceProfile {
        &self.active_profile
    }

    /// Releasing note whose stop time comes first.
    fn shortest_tail(&self) -> Option<NoteId> {
        self.tails
            .values()
            .min_by(|a, b| {
                let a = a.stop_at().unwrap_or(f64::INFINITY);
                let b = b.stop_at().unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            })
            .map(ActiveVoice::note)
    }

    /// Drop finished release tails and free voices the renderer retired.
    pub fn maintain(&mut self) {
        let now = self.backend.now();
        self.tails
            .retain(|_, voice| voice.stop_at().is_none_or(|stop| stop > now));
        self.backend.collect_garbage();
    }

    /// Sounding notes, oldest first. Releasing notes are not included.
    pub fn sounding_notes(&self) -> Vec<NoteId> {
        self.table.notes().collect()
    }

    /// Number of sounding (not releasing) notes.
    pub fn voice_count(&self) -> usize {
        self.table.len()
    }

    /// Released notes whose tails have not finished yet.
    pub fn releasing_count(&self) -> usize {
        self.tails.len()
    }

    pub fn is_sounding(&self, note: NoteId) -> bool {
        self.table.contains(note)
    }

    pub fn voice(&self, note: NoteId) -> Option<&ActiveVoice> {
        self.table.get(note)
    }

    pub fn releasing_voice(&self, note: NoteId) -> Option<&ActiveVoice> {
        self.tails.get(&note)
    }

    /// Scheduled envelope gain of `note` at clock time `time`, sounding or
    /// releasing.
    pub fn gain_at(&self, note: NoteId, time: f64) -> Option<f32> {
        self.table
            .get(note)
            .or_else(|| self.tails.get(&note))
            .map(|voice| voice.gain().value_at(time))
    }

    pub fn now(&self) -> f64 {
        self.backend.now()
    }

    /// Velocity for front-ends without velocity sensing.
    pub fn default_velocity(&self) -> f32 {
        self.config.default_velocity
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
