/*
Automated Parameters
====================

An `AudioParam` is a value that follows a timeline of scheduled events
instead of being set directly. Voices use it for their gain envelope and for
the wet level of a delay send, so the control thread can describe a whole
attack/decay/release shape in one go and the audio thread plays it back
sample-accurately.

Events
------

    set(v, t)    jump to v at time t
    ramp(v, t)   arrive at v at time t, moving in a straight line from the
                 previous event's value and time
    cancel(t)    forget every event at or after t

Reading the timeline at time t:

    value
      │        ramp(1.0, 0.02)
      │          ●
      │         ╱ ╲      ramp(0.7, 0.12)
      │        ╱   ╲________●━━━━━━━━━━  held after the last event
      │       ╱
      │  ●───╯
      │  set(0, 0.0)
      └──────────────────────────────────── time

- Before the first event the param sits at its default value.
- Between an event and a later ramp, the value interpolates linearly.
- After the last event the value holds.

Cancel and the current value
----------------------------

`cancel(t)` drops future events but does not freeze the value at t: if a
ramp was in flight, the timeline snaps back to the last surviving event.
Anyone who wants to release from "where the sound is now" must read
`value_at(now)` BEFORE cancelling, then `set` that value at now:

    let current = gain.value_at(now);
    gain.cancel_scheduled_values(now);
    gain.set_value_at_time(current, now);
    gain.linear_ramp_to_value_at_time(0.0001, now + release);

Both the engine's mirror and the audio thread's param apply the same
events, so they agree on `value_at` at every instant.
*/

/// One scheduling operation, as sent across to the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Automation {
    SetValueAtTime { value: f32, time: f64 },
    LinearRampToValueAtTime { value: f32, time: f64 },
    CancelScheduledValues { time: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EventKind {
    Set,
    LinearRamp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ParamEvent {
    kind: EventKind,
    value: f32,
    time: f64,
}

#[derive(Debug, Clone)]
pub struct AudioParam {
    default_value: f32,
    events: Vec<ParamEvent>,
}

impl AudioParam {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            // enough for a note-on plus a note-off without reallocating
            events: Vec::with_capacity(8),
        }
    }

    fn insert(&mut self, event: ParamEvent) {
        // events at equal times keep scheduling order
        let index = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(index, event);
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent {
            kind: EventKind::Set,
            value,
            time,
        });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(ParamEvent {
            kind: EventKind::LinearRamp,
            value,
            time,
        });
    }

    /// Remove every event scheduled at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        let keep = self.events.partition_point(|e| e.time < time);
        self.events.truncate(keep);
    }

    pub fn apply(&mut self, automation: Automation) {
        match automation {
            Automation::SetValueAtTime { value, time } => self.set_value_at_time(value, time),
            Automation::LinearRampToValueAtTime { value, time } => {
                self.linear_ramp_to_value_at_time(value, time)
            }
            Automation::CancelScheduledValues { time } => self.cancel_scheduled_values(time),
        }
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let next = self.events.partition_point(|e| e.time <= time);

        let (anchor_time, anchor_value) = match next.checked_sub(1) {
            Some(i) => (self.events[i].time, self.events[i].value),
            None => (f64::NEG_INFINITY, self.default_value),
        };

        match self.events.get(next) {
            Some(ramp) if ramp.kind == EventKind::LinearRamp => {
                if !anchor_time.is_finite() || ramp.time <= anchor_time {
                    // a ramp with nothing before it starts from the default at once
                    return anchor_value;
                }
                let progress = ((time - anchor_time) / (ramp.time - anchor_time)) as f32;
                anchor_value + (ramp.value - anchor_value) * progress
            }
            _ => anchor_value,
        }
    }

    /// Fill `out` with one value per sample starting at `start`.
    pub fn fill(&self, out: &mut [f32], start: f64, sample_rate: f32) {
        let period = 1.0 / sample_rate as f64;
        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.value_at(start + i as f64 * period);
        }
    }

    /// Forget events that can no longer influence any time >= `time`.
    ///
    /// The last event at or before `time` is kept as the anchor for whatever
    /// comes next, rewritten as a plain set of the same value.
    pub fn prune_before(&mut self, time: f64) {
        let reached = self.events.partition_point(|e| e.time <= time);
        if reached < 2 {
            return;
        }
        let anchor = self.events[reached - 1];
        self.events.drain(..reached - 1);
        self.events[0] = ParamEvent {
            kind: EventKind::Set,
            ..anchor
        };
    }

    /// Time of the last scheduled event, if any.
    pub fn last_event_time(&self) -> Option<f64> {
        self.events.last().map(|e| e.time)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }
}
