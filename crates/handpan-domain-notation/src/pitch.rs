use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const A4_HZ: f64 = 440.0;
pub const A4_MIDI: i32 = 69;
/// MIDI number of C3; `Note::value` counts semitones from here.
pub const VALUE_ORIGIN_MIDI: i32 = 48;
pub const MAX_OCTAVE: u8 = 8;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PitchError {
    #[error("invalid note name: {0}")]
    InvalidName(String),
    #[error("octave out of range: {0}")]
    OctaveOutOfRange(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    fn natural_semitone(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// Spelled pitch class such as `F#` or `Bb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteName {
    pub letter: Letter,
    pub accidental: Accidental,
}

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

impl NoteName {
    pub const fn natural(letter: Letter) -> Self {
        Self {
            letter,
            accidental: Accidental::Natural,
        }
    }

    /// Parses `C`, `F#`, `Bb` (letter case-insensitive). Only the twelve
    /// sharp spellings and five flat spellings in common use are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        let letter = Letter::from_char(chars.next()?)?;
        let accidental = match chars.next() {
            None => Accidental::Natural,
            Some('#') => Accidental::Sharp,
            Some('b') => Accidental::Flat,
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        let name = Self { letter, accidental };
        let spelled = name.to_string();
        if SHARP_NAMES.contains(&spelled.as_str()) || FLAT_NAMES.contains(&spelled.as_str()) {
            Some(name)
        } else {
            None
        }
    }

    pub fn semitone(self) -> u8 {
        let natural = self.letter.natural_semitone() as i8;
        let shifted = match self.accidental {
            Accidental::Natural => natural,
            Accidental::Sharp => natural + 1,
            Accidental::Flat => natural - 1,
        };
        shifted.rem_euclid(12) as u8
    }

    pub fn is_enharmonic(self, other: NoteName) -> bool {
        self.semitone() == other.semitone()
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter.as_char())?;
        match self.accidental {
            Accidental::Natural => Ok(()),
            Accidental::Sharp => write!(f, "#"),
            Accidental::Flat => write!(f, "b"),
        }
    }
}

impl Serialize for NoteName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NoteName::parse(&raw).ok_or_else(|| serde::de::Error::custom(PitchError::InvalidName(raw)))
    }
}

/// Sharp spelling for a pitch class (`0` = C).
pub fn note_name_for_pitch_class(pitch_class: u8) -> NoteName {
    let spelled = SHARP_NAMES[(pitch_class % 12) as usize];
    NoteName::parse(spelled).unwrap_or(NoteName::natural(Letter::C))
}

/// Flat spelling for a pitch class (`1` = Db).
pub fn flat_name_for_pitch_class(pitch_class: u8) -> NoteName {
    let spelled = FLAT_NAMES[(pitch_class % 12) as usize];
    NoteName::parse(spelled).unwrap_or(NoteName::natural(Letter::C))
}

/// An instrument pitch: spelled name plus octave. `value` is the distance in
/// semitones from C3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub name: NoteName,
    pub octave: u8,
    pub value: i32,
}

impl Note {
    pub fn new(name: NoteName, octave: u8) -> Result<Self, PitchError> {
        if octave > MAX_OCTAVE {
            return Err(PitchError::OctaveOutOfRange(octave));
        }
        let midi = (octave as i32 + 1) * 12 + name.semitone() as i32;
        Ok(Self {
            name,
            octave,
            value: midi - VALUE_ORIGIN_MIDI,
        })
    }

    /// Parses a note id such as `E3`, `f#4` or `D:G3` (the ding marker is
    /// ignored here).
    pub fn parse(id: &str) -> Result<Self, PitchError> {
        let clean = id.strip_prefix("D:").unwrap_or(id);
        let invalid = || PitchError::InvalidName(id.to_string());

        let mut chars = clean.chars();
        let octave_char = chars.next_back().ok_or_else(invalid)?;
        let octave = octave_char.to_digit(10).ok_or_else(invalid)? as u8;
        let name = NoteName::parse(chars.as_str()).ok_or_else(invalid)?;
        Note::new(name, octave)
    }

    pub fn midi(&self) -> i32 {
        self.value + VALUE_ORIGIN_MIDI
    }

    pub fn pitch_class(&self) -> u8 {
        self.value.rem_euclid(12) as u8
    }

    pub fn frequency(&self) -> f64 {
        A4_HZ * 2f64.powf((self.midi() - A4_MIDI) as f64 / 12.0)
    }

    pub fn same_pitch(&self, other: &Note) -> bool {
        self.value == other.value
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Frequency of a note id, or `0.0` when the id does not parse.
pub fn frequency_for(id: &str) -> f64 {
    Note::parse(id).map(|note| note.frequency()).unwrap_or(0.0)
}

/// Sorts notes ascending by pitch; equal pitches keep their order.
pub fn sort_by_pitch(notes: &mut [Note]) {
    notes.sort_by_key(|note| note.value);
}
