use handpan_domain_harmony::{
    categorize, generate_chords, identify_chord, ChordCategory, ChordType, NotationStyle,
};
use handpan_domain_notation::{e_amara, InstrumentLayout, Note};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn notes(ids: &[&str]) -> Vec<Note> {
    ids.iter().map(|id| Note::parse(id).expect("note")).collect()
}

fn amara_notes() -> Vec<Note> {
    InstrumentLayout::from_dto(e_amara())
        .expect("layout")
        .notes()
}

fn ids(notes: &[Note]) -> Vec<String> {
    notes.iter().map(Note::to_string).collect()
}

#[test]
fn identifies_c_major_triad() {
    let found = identify_chord(&notes(&["C3", "E3", "G3"])).expect("chord");
    assert_eq!(found.root.to_string(), "C");
    assert_eq!(found.chord_type, ChordType::Major);
    assert_eq!(found.interval_signature, vec![4, 7]);
    assert_eq!(found.name(), "C Major");
}

#[test]
fn input_order_does_not_matter() {
    let found = identify_chord(&notes(&["B3", "G3", "E3"])).expect("chord");
    assert_eq!(found.name(), "E Minor");
    assert_eq!(ids(&found.notes), vec!["E3", "G3", "B3"]);
}

#[test]
fn inversion_names_the_true_root() {
    let found = identify_chord(&notes(&["D4", "G4", "B4"])).expect("chord");
    assert_eq!(found.name(), "G Major");
}

#[test]
fn note_count_must_match_vocabulary_size() {
    assert_eq!(
        identify_chord(&notes(&["A3", "C4", "E4", "G4"])).map(|m| m.name()),
        Some("A Min7".to_string())
    );
    assert_eq!(
        identify_chord(&notes(&["E3", "B3"])).map(|m| m.chord_type),
        Some(ChordType::Power)
    );
    assert!(identify_chord(&notes(&["E3", "E4"])).is_none());
    assert!(identify_chord(&notes(&["C3", "C#3"])).is_none());
    assert!(identify_chord(&notes(&["C3", "E3", "G3", "C4"])).is_none());
}

#[test]
fn amara_chords_are_ranked_by_priority_then_root() {
    let chords = generate_chords(&amara_notes());
    let leading: Vec<&str> = chords.iter().take(4).map(|c| c.name.as_str()).collect();
    assert_eq!(leading, vec!["B Minor", "E Minor", "D Major", "G Major"]);

    let priorities: Vec<u8> = chords.iter().map(|c| c.chord_type.priority()).collect();
    let mut sorted = priorities.clone();
    sorted.sort();
    assert_eq!(priorities, sorted);
}

#[test]
fn voicings_are_unique_per_chord() {
    for chord in generate_chords(&amara_notes()) {
        let mut seen = HashSet::new();
        for voicing in &chord.voicings {
            let mut values: Vec<i32> = voicing.iter().map(|n| n.value).collect();
            values.sort();
            assert!(seen.insert(values), "duplicate voicing in {}", chord.name);
        }
    }
}

#[test]
fn root_position_voicings_come_first() {
    let chords = generate_chords(&amara_notes());
    let e_minor = chords.iter().find(|c| c.name == "E Minor").expect("E Minor");

    assert_eq!(ids(&e_minor.voicings[0]), vec!["E3", "G3", "B3"]);
    let first_inverted = e_minor
        .voicings
        .iter()
        .position(|v| !e_minor.has_root_in_bass(v))
        .expect("inversion");
    assert!(e_minor.voicings[first_inverted..]
        .iter()
        .all(|v| !e_minor.has_root_in_bass(v)));

    assert_eq!(
        ids(&e_minor.arpeggio),
        vec!["E3", "B3", "E4", "G4", "B4", "G3", "E5"]
    );
    assert_eq!(e_minor.to_notation(NotationStyle::Sequential), "E3 G3 B3");
}

#[test]
fn categories_sort_by_root_pitch() {
    let grid = categorize(&generate_chords(&amara_notes()));
    let main: Vec<&str> = grid.main.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(main, vec!["E Minor", "G Major", "B Minor", "D Major"]);
    assert!(grid
        .get(ChordCategory::Dyad)
        .iter()
        .all(|c| c.category() == ChordCategory::Dyad));
    assert!(grid.color.iter().all(|c| c.category() == ChordCategory::Color));
}

#[test]
fn empty_instrument_has_no_chords() {
    assert!(generate_chords(&[]).is_empty());
}

#[test]
fn arpeggio_and_bass_follow_spelling_not_pitch() {
    let instrument = notes(&["Bb3", "D4", "F4", "A#4"]);
    let chords = generate_chords(&instrument);

    let b_flat = chords.iter().find(|c| c.name == "Bb Major").expect("Bb Major");
    assert_eq!(ids(&b_flat.arpeggio), vec!["Bb3", "D4", "F4"]);
    assert!(b_flat.has_root_in_bass(&notes(&["Bb3", "D4", "F4"])));

    let a_sharp = chords.iter().find(|c| c.name == "A# Major").expect("A# Major");
    assert_eq!(ids(&a_sharp.arpeggio), vec!["D4", "F4", "A#4"]);
    assert!(!a_sharp.has_root_in_bass(&notes(&["Bb3", "D4", "F4"])));
}
