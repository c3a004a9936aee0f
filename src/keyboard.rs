//! Computer keyboard to note mapping shared by front-ends.
//!
//! Two rows of letters form two overlapping piano octaves:
//!
//! ```text
//!   2 3   5 6 7   9 0          s d   g h j   l ;
//!  q w e r t y u i o p        z x c v b n m , . /
//!  C4 ........... C5 .. E5    C3 ........... C4 .. E4
//! ```
//!
//! Holding the octave shift moves everything up [`OCTAVE_SHIFT`] octaves.

use std::collections::HashMap;

use crate::pitch::{NoteId, PitchClass};

/// Octaves added to every mapped note while the shift toggle is on.
pub const OCTAVE_SHIFT: i8 = 2;

/// Lowest octave shown on the key bed.
pub const LAYOUT_START_OCTAVE: i8 = 3;

/// Widest key bed [`KeyboardLayout`] will draw.
pub const MAX_LAYOUT_OCTAVES: u8 = 6;

const STANDARD_KEYS: [(char, PitchClass, i8); 34] = [
    ('z', PitchClass::C, 3),
    ('x', PitchClass::D, 3),
    ('c', PitchClass::E, 3),
    ('v', PitchClass::F, 3),
    ('b', PitchClass::G, 3),
    ('n', PitchClass::A, 3),
    ('m', PitchClass::B, 3),
    (',', PitchClass::C, 4),
    ('.', PitchClass::D, 4),
    ('/', PitchClass::E, 4),
    ('q', PitchClass::C, 4),
    ('w', PitchClass::D, 4),
    ('e', PitchClass::E, 4),
    ('r', PitchClass::F, 4),
    ('t', PitchClass::G, 4),
    ('y', PitchClass::A, 4),
    ('u', PitchClass::B, 4),
    ('i', PitchClass::C, 5),
    ('o', PitchClass::D, 5),
    ('p', PitchClass::E, 5),
    ('s', PitchClass::Db, 3),
    ('d', PitchClass::Eb, 3),
    ('g', PitchClass::Gb, 3),
    ('h', PitchClass::Ab, 3),
    ('j', PitchClass::Bb, 3),
    ('l', PitchClass::Db, 4),
    (';', PitchClass::Eb, 4),
    ('2', PitchClass::Db, 4),
    ('3', PitchClass::Eb, 4),
    ('5', PitchClass::Gb, 4),
    ('6', PitchClass::Ab, 4),
    ('7', PitchClass::Bb, 4),
    ('9', PitchClass::Db, 5),
    ('0', PitchClass::Eb, 5),
];

/// Physical key → unshifted note.
#[derive(Debug, Clone)]
pub struct KeyMap {
    keys: HashMap<char, NoteId>,
}

impl KeyMap {
    pub fn standard() -> Self {
        let keys = STANDARD_KEYS
            .iter()
            .map(|&(key, pitch, octave)| (key, NoteId::new(pitch, octave)))
            .collect();
        Self { keys }
    }

    /// Letters are matched case-insensitively.
    pub fn note_for(&self, key: char) -> Option<NoteId> {
        self.keys.get(&key.to_ascii_lowercase()).copied()
    }

    /// Note for `key` with the octave shift applied when `shifted`.
    pub fn resolve(&self, key: char, shifted: bool) -> Option<NoteId> {
        let note = self.note_for(key)?;
        if shifted {
            note.transpose_octaves(OCTAVE_SHIFT)
        } else {
            Some(note)
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// First key (in `a`..`z`, digits, punctuation order) that plays `note`
    /// unshifted. Used for labels.
    pub fn label_for(&self, note: NoteId) -> Option<char> {
        let mut keys: Vec<char> = self
            .keys
            .iter()
            .filter(|(_, n)| **n == note)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| (!k.is_ascii_alphabetic(), *k));
        keys.first().copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Keys currently held down and the note each one started.
///
/// The note is fixed at press time, so toggling the shift while a key is
/// down still releases the note that key actually started.
#[derive(Debug, Default)]
pub struct HeldKeys {
    held: HashMap<char, NoteId>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns the note to start, or `None` for unmapped
    /// keys and for repeats of a key that is already held.
    pub fn press(&mut self, map: &KeyMap, key: char, shifted: bool) -> Option<NoteId> {
        let key = key.to_ascii_lowercase();
        if self.held.contains_key(&key) {
            return None;
        }
        let note = map.resolve(key, shifted)?;
        self.held.insert(key, note);
        Some(note)
    }

    /// Record a key release. Returns the note to stop, if the key was held.
    pub fn release(&mut self, key: char) -> Option<NoteId> {
        self.held.remove(&key.to_ascii_lowercase())
    }

    pub fn is_held(&self, key: char) -> bool {
        self.held.contains_key(&key.to_ascii_lowercase())
    }

    /// Notes currently held, any order.
    pub fn notes(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.held.values().copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        self.held.keys().copied()
    }

    /// Forget every held key, returning their notes.
    pub fn release_all(&mut self) -> Vec<NoteId> {
        self.held.drain().map(|(_, note)| note).collect()
    }
}

/// A black key and the index of the white key to its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlackKey {
    pub note: NoteId,
    pub left_white: usize,
}

/// Visible key bed: C3 up to E of the last octave.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    whites: Vec<NoteId>,
    blacks: Vec<BlackKey>,
}

impl KeyboardLayout {
    /// `octaves` full octaves from C3, plus C D E of the next. Clamped to
    /// `1..=MAX_LAYOUT_OCTAVES`.
    pub fn new(octaves: u8) -> Self {
        let octaves = octaves.clamp(1, MAX_LAYOUT_OCTAVES) as i8;
        let first = NoteId::new(PitchClass::C, LAYOUT_START_OCTAVE).semitone();
        let last = NoteId::new(PitchClass::E, LAYOUT_START_OCTAVE + octaves).semitone();

        let mut whites = Vec::new();
        let mut blacks = Vec::new();
        for note in (first..=last).filter_map(NoteId::from_semitone) {
            if note.pitch().is_accidental() {
                // every black key sits right of the white key one semitone down
                if let Some(left_white) = whites.len().checked_sub(1) {
                    blacks.push(BlackKey { note, left_white });
                }
            } else {
                whites.push(note);
            }
        }
        Self { whites, blacks }
    }

    pub fn whites(&self) -> &[NoteId] {
        &self.whites
    }

    pub fn blacks(&self) -> &[BlackKey] {
        &self.blacks
    }

    pub fn contains(&self, note: NoteId) -> bool {
        self.whites.contains(&note) || self.blacks.iter().any(|b| b.note == note)
    }
}
