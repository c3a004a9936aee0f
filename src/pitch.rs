use std::{cmp::Ordering, fmt, str::FromStr};

use crate::error::{KeybedError, Result};

/*
Pitch Resolution
================

Every key on the instrument is identified by a note name such as "Db4":
a pitch class (one of twelve semitones) followed by an octave number.

Semitone Numbering
------------------

Within an octave the twelve pitch classes are numbered from C:

    C  Db  D  Eb  E  F  Gb  G  Ab  A  Bb  B
    0  1   2  3   4  5  6   7  8   9  10  11

Sharps and flats that name the same key collapse to the same number, so
C#4 and Db4 are one note. Across octaves:

    absolute = octave * 12 + offset

Spellings that step over an octave boundary are folded through the absolute
number, so Cb4 (absolute 47) is the key B3 and B#3 (absolute 48) is C4.


Equal Temperament
-----------------

Each semitone multiplies frequency by 2^(1/12). The reference is A4
(absolute 4*12+9 = 57) tuned to 440 Hz:

    frequency = 440 * 2^((absolute - 57) / 12)

    A3  = 220.00 Hz     (12 semitones below)
    C4  = 261.63 Hz     (9 below)
    A4  = 440.00 Hz     (reference)
    A5  = 880.00 Hz     (12 above)
*/

/// Tuning reference: A4 in Hz.
pub const TUNING_A4: f32 = 440.0;

/// Absolute semitone number of A4.
pub const A4_SEMITONE: i32 = 4 * 12 + 9;

/// The twelve semitones of an octave, named with the flat spellings the key
/// labels use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PitchClass {
    C,
    Db,
    D,
    Eb,
    E,
    F,
    Gb,
    G,
    Ab,
    A,
    Bb,
    B,
}

impl PitchClass {
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Db,
        PitchClass::D,
        PitchClass::Eb,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Gb,
        PitchClass::G,
        PitchClass::Ab,
        PitchClass::A,
        PitchClass::Bb,
        PitchClass::B,
    ];

    /// Semitones above C, 0-11.
    pub fn offset(self) -> i32 {
        self as i32
    }

    /// Wraps any integer into the octave.
    pub fn from_offset(offset: i32) -> Self {
        Self::ALL[offset.rem_euclid(12) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Db => "Db",
            PitchClass::D => "D",
            PitchClass::Eb => "Eb",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Gb => "Gb",
            PitchClass::G => "G",
            PitchClass::Ab => "Ab",
            PitchClass::A => "A",
            PitchClass::Bb => "Bb",
            PitchClass::B => "B",
        }
    }

    /// Black keys on a piano layout.
    pub fn is_accidental(self) -> bool {
        matches!(
            self,
            PitchClass::Db | PitchClass::Eb | PitchClass::Gb | PitchClass::Ab | PitchClass::Bb
        )
    }
}

/// Semitone offset of a spelled pitch class, before octave folding.
///
/// Returns -1 for Cb and 12 for B#; the caller folds those into the
/// neighbouring octave.
fn spelled_offset(spelling: &str) -> Option<i32> {
    let mut chars = spelling.chars();
    let letter = chars.next()?;
    let natural = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let accidental = chars.as_str().to_ascii_lowercase();
    let shift = match accidental.as_str() {
        "" => 0,
        "#" | "♯" | "s" | "sharp" | "-sharp" => 1,
        "b" | "♭" | "flat" | "-flat" => -1,
        _ => return None,
    };

    Some(natural + shift)
}

/// A key on the instrument: pitch class plus octave.
///
/// Equality, hashing and ordering all follow the absolute semitone number, so
/// two spellings of one key are the same identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteId {
    pitch: PitchClass,
    octave: i8,
}

impl NoteId {
    pub const fn new(pitch: PitchClass, octave: i8) -> Self {
        Self { pitch, octave }
    }

    /// Builds the note for an absolute semitone number, if its octave fits.
    pub fn from_semitone(semitone: i32) -> Option<Self> {
        let octave = i8::try_from(semitone.div_euclid(12)).ok()?;
        Some(Self {
            pitch: PitchClass::from_offset(semitone),
            octave,
        })
    }

    pub fn pitch(self) -> PitchClass {
        self.pitch
    }

    pub fn octave(self) -> i8 {
        self.octave
    }

    /// `octave * 12 + offset`.
    pub fn semitone(self) -> i32 {
        self.octave as i32 * 12 + self.pitch.offset()
    }

    /// Fundamental frequency in Hz, equal temperament around A4 = 440 Hz.
    pub fn frequency(self) -> f32 {
        let distance = self.semitone() - A4_SEMITONE;
        TUNING_A4 * 2.0_f32.powf(distance as f32 / 12.0)
    }

    /// Same pitch class, `octaves` higher (or lower when negative).
    pub fn transpose_octaves(self, octaves: i8) -> Option<Self> {
        Some(Self {
            pitch: self.pitch,
            octave: self.octave.checked_add(octaves)?,
        })
    }
}

impl Ord for NoteId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semitone().cmp(&other.semitone())
    }
}

impl PartialOrd for NoteId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.name(), self.octave)
    }
}

impl FromStr for NoteId {
    type Err = KeybedError;

    /// Parses names like `C4`, `Db4`, `c#3`, `B-flat2`, `Gsharp5` or `A-1`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let digits = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| KeybedError::MissingOctave(s.to_string()))?;

        // A minus sign directly before the digits belongs to the octave.
        let split = if s[..digits].ends_with('-') {
            digits - 1
        } else {
            digits
        };
        let (spelling, octave) = s.split_at(split);

        let offset = spelled_offset(spelling)
            .ok_or_else(|| KeybedError::UnknownPitchClass(spelling.to_string()))?;
        let octave: i32 = octave
            .parse()
            .map_err(|_| KeybedError::InvalidOctave(s.to_string()))?;

        octave
            .checked_mul(12)
            .and_then(|base| base.checked_add(offset))
            .and_then(NoteId::from_semitone)
            .ok_or_else(|| KeybedError::InvalidOctave(s.to_string()))
    }
}

/// Resolve a note name straight to Hz.
///
/// Malformed names are an error; there is no silent 0 Hz fallback.
pub fn frequency_of(name: &str) -> Result<f32> {
    name.parse::<NoteId>().map(NoteId::frequency)
}
