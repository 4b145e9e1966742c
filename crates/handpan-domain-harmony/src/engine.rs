//! Chord identification and enumeration over an instrument's notes.

use crate::chord::ChordType;
use handpan_domain_notation::{Note, NoteName};
use serde::Serialize;
use std::collections::HashMap;

/// Largest note set the generator combines.
pub const MAX_CHORD_SIZE: usize = 4;

/// Result of matching one note set against the vocabulary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChordMatch {
    pub root: NoteName,
    pub chord_type: ChordType,
    /// Matched notes, ascending by pitch.
    pub notes: Vec<Note>,
    /// Distinct non-zero intervals above the root, ascending.
    pub interval_signature: Vec<u8>,
}

impl ChordMatch {
    pub fn name(&self) -> String {
        chord_name(self.root, self.chord_type)
    }
}

/// A chord playable on the instrument, with every distinct voicing found.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chord {
    pub root: NoteName,
    pub chord_type: ChordType,
    pub name: String,
    /// Notes of the first matching combination.
    pub notes: Vec<Note>,
    pub interval_signature: Vec<u8>,
    /// Root-in-bass voicings first, then ascending by summed pitch value.
    pub voicings: Vec<Vec<Note>>,
    /// Every instrument note spelled like one of the chord's notes, in
    /// instrument order. `A#4` does not join a `Bb` chord.
    pub arpeggio: Vec<Note>,
}

impl Chord {
    fn from_match(found: ChordMatch) -> Self {
        Self {
            name: found.name(),
            root: found.root,
            chord_type: found.chord_type,
            voicings: vec![found.notes.clone()],
            notes: found.notes,
            interval_signature: found.interval_signature,
            arpeggio: Vec::new(),
        }
    }

    pub fn has_root_in_bass(&self, voicing: &[Note]) -> bool {
        voicing
            .first()
            .is_some_and(|bass| bass.name == self.root)
    }

    /// Voicing used when the chord becomes a progression step: the first
    /// three-note voicing with the root in the bass, else the first voicing,
    /// else the arpeggio.
    pub fn preferred_voicing(&self) -> &[Note] {
        self.voicings
            .iter()
            .find(|voicing| voicing.len() == 3 && self.has_root_in_bass(voicing))
            .or_else(|| self.voicings.first())
            .map(Vec::as_slice)
            .unwrap_or(&self.arpeggio)
    }
}

pub fn chord_name(root: NoteName, chord_type: ChordType) -> String {
    format!("{root} {}", chord_type.symbol())
}

/// Names the chord formed by `notes`, trying each note as root from the
/// lowest up. The first root and vocabulary entry that match win. An entry
/// matches when all of its intervals are present and it accounts for every
/// other note.
pub fn identify_chord(notes: &[Note]) -> Option<ChordMatch> {
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|note| note.value);

    for root_idx in 0..sorted.len() {
        let signature = interval_signature(&sorted, root_idx);

        let found = ChordType::ALL.into_iter().find(|ty| {
            let required = ty.intervals();
            required.len() + 1 == sorted.len()
                && required.iter().all(|interval| signature.contains(interval))
        });

        if let Some(chord_type) = found {
            return Some(ChordMatch {
                root: sorted[root_idx].name,
                chord_type,
                interval_signature: signature,
                notes: sorted,
            });
        }
    }
    None
}

fn interval_signature(sorted: &[Note], root_idx: usize) -> Vec<u8> {
    let root = sorted[root_idx].value;
    let mut intervals: Vec<u8> = sorted
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != root_idx)
        .map(|(_, note)| (note.value - root).rem_euclid(12) as u8)
        .filter(|interval| *interval != 0)
        .collect();
    intervals.sort_unstable();
    intervals.dedup();
    intervals
}

/// Every chord reachable with two to four of `instrument_notes`.
///
/// Chords are grouped by name in first-seen order, voicings are deduplicated
/// by their pitch set, and the result is ranked by chord priority then root
/// name.
pub fn generate_chords(instrument_notes: &[Note]) -> Vec<Chord> {
    let mut chords: Vec<Chord> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut combo = Vec::with_capacity(MAX_CHORD_SIZE);

    for size in 2..=MAX_CHORD_SIZE {
        let mut visit = |indices: &[usize]| {
            let notes: Vec<Note> = indices.iter().map(|&idx| instrument_notes[idx]).collect();
            let Some(found) = identify_chord(&notes) else {
                return;
            };

            match by_name.get(&found.name()) {
                Some(&slot) => {
                    let chord = &mut chords[slot];
                    let key = voicing_key(&found.notes);
                    if !chord.voicings.iter().any(|v| voicing_key(v) == key) {
                        chord.voicings.push(found.notes);
                    }
                }
                None => {
                    by_name.insert(found.name(), chords.len());
                    chords.push(Chord::from_match(found));
                }
            }
        };
        for_each_combination(instrument_notes.len(), size, 0, &mut combo, &mut visit);
    }

    for chord in &mut chords {
        let names: Vec<NoteName> = chord.notes.iter().map(|note| note.name).collect();
        chord.arpeggio = instrument_notes
            .iter()
            .filter(|note| names.contains(&note.name))
            .copied()
            .collect();

        let root = chord.root;
        chord.voicings.sort_by_key(|voicing| {
            let root_in_bass = voicing.first().is_some_and(|n| n.name == root);
            (!root_in_bass, voicing.iter().map(|n| n.value).sum::<i32>())
        });
    }

    chords.sort_by(|a, b| {
        a.chord_type
            .priority()
            .cmp(&b.chord_type.priority())
            .then_with(|| a.root.to_string().cmp(&b.root.to_string()))
    });

    log::debug!(
        "harmony: {} chord(s) from {} note(s)",
        chords.len(),
        instrument_notes.len()
    );
    chords
}

fn voicing_key(notes: &[Note]) -> Vec<i32> {
    let mut values: Vec<i32> = notes.iter().map(|note| note.value).collect();
    values.sort_unstable();
    values
}

fn for_each_combination(
    len: usize,
    size: usize,
    start: usize,
    current: &mut Vec<usize>,
    visit: &mut dyn FnMut(&[usize]),
) {
    if current.len() == size {
        visit(current);
        return;
    }
    for idx in start..len {
        current.push(idx);
        for_each_combination(len, size, idx + 1, current, visit);
        current.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinations_are_lexicographic() {
        let mut seen = Vec::new();
        let mut record = |idx: &[usize]| seen.push(idx.to_vec());
        for_each_combination(4, 2, 0, &mut Vec::new(), &mut record);
        assert_eq!(
            seen,
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
    }

    #[test]
    fn signature_skips_unisons_and_octaves() {
        let notes: Vec<Note> = ["C3", "G3", "C4"]
            .iter()
            .map(|id| Note::parse(id).unwrap())
            .collect();
        assert_eq!(interval_signature(&notes, 0), vec![7]);
    }
}
