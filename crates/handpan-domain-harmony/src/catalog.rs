use crate::chord::ChordType;
use crate::engine::Chord;
use handpan_domain_notation::{Note, NoteName};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordCategory {
    /// Major and minor triads.
    Main,
    /// Sevenths, suspended and diminished shapes.
    Color,
    /// Power chords and bare thirds.
    Dyad,
}

impl ChordType {
    pub fn category(self) -> ChordCategory {
        match self {
            ChordType::Major | ChordType::Minor => ChordCategory::Main,
            ChordType::Power | ChordType::MajorThird | ChordType::MinorThird => {
                ChordCategory::Dyad
            }
            _ => ChordCategory::Color,
        }
    }
}

/// Chords split into display groups, each ordered by the pitch of its root.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CategorizedChords {
    pub main: Vec<Chord>,
    pub color: Vec<Chord>,
    pub dyad: Vec<Chord>,
}

impl CategorizedChords {
    pub fn get(&self, category: ChordCategory) -> &[Chord] {
        match category {
            ChordCategory::Main => &self.main,
            ChordCategory::Color => &self.color,
            ChordCategory::Dyad => &self.dyad,
        }
    }
}

/// Lowest pitch value at which the chord's root appears in its arpeggio.
/// Chords whose root never appears sort last.
fn root_pitch_value(chord: &Chord) -> i32 {
    let root = chord.root.semitone();
    chord
        .arpeggio
        .iter()
        .filter(|note| note.pitch_class() == root)
        .map(|note| note.value)
        .min()
        .unwrap_or(i32::MAX)
}

pub fn categorize(chords: &[Chord]) -> CategorizedChords {
    let mut out = CategorizedChords::default();
    for chord in chords {
        let bucket = match chord.chord_type.category() {
            ChordCategory::Main => &mut out.main,
            ChordCategory::Color => &mut out.color,
            ChordCategory::Dyad => &mut out.dyad,
        };
        bucket.push(chord.clone());
    }
    for bucket in [&mut out.main, &mut out.color, &mut out.dyad] {
        bucket.sort_by_key(root_pitch_value);
    }
    out
}

const DEGREE_NAMES: [&str; 12] = [
    "I", "bII", "II", "bIII", "III", "IV", "bV", "V", "bVI", "VI", "bVII", "VII",
];

/// Roman numeral of `root` relative to the ding's pitch class.
pub fn degree_name(root: NoteName, ding: NoteName) -> &'static str {
    let semitones = (root.semitone() + 12 - ding.semitone()) % 12;
    DEGREE_NAMES[semitones as usize]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotationStyle {
    /// Ascending single strokes, `E3 G3 B3`.
    Sequential,
    /// One simultaneous group, `E3|G3|B3`.
    Simultaneous,
}

/// Renders notes as notation text, ascending by pitch.
pub fn notes_to_notation(notes: &[Note], style: NotationStyle) -> String {
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|note| note.value);
    let tokens: Vec<String> = sorted.iter().map(Note::to_string).collect();
    match style {
        NotationStyle::Sequential => tokens.join(" "),
        NotationStyle::Simultaneous => tokens.join("|"),
    }
}

impl Chord {
    pub fn category(&self) -> ChordCategory {
        self.chord_type.category()
    }

    /// Step text for adding this chord to a progression.
    pub fn to_notation(&self, style: NotationStyle) -> String {
        notes_to_notation(self.preferred_voicing(), style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(raw: &str) -> NoteName {
        NoteName::parse(raw).unwrap()
    }

    #[test]
    fn degrees_are_relative_to_ding() {
        assert_eq!(degree_name(name("E"), name("E")), "I");
        assert_eq!(degree_name(name("G"), name("E")), "bIII");
        assert_eq!(degree_name(name("D"), name("E")), "bVII");
        assert_eq!(degree_name(name("Bb"), name("D")), "bVI");
    }

    #[test]
    fn simultaneous_notation_uses_pipes() {
        let notes: Vec<Note> = ["B3", "E3", "G3"]
            .iter()
            .map(|id| Note::parse(id).unwrap())
            .collect();
        assert_eq!(notes_to_notation(&notes, NotationStyle::Sequential), "E3 G3 B3");
        assert_eq!(
            notes_to_notation(&notes, NotationStyle::Simultaneous),
            "E3|G3|B3"
        );
    }
}
