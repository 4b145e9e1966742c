use handpan_domain_notation::{
    e_amara, DiagnosticReason, EventKind, InstrumentLayout, NotationParser, Note, NoteEvent,
    PercussionHit, Sound,
};
use handpan_ports::types::{BottomMap, PercussionHand};
use pretty_assertions::assert_eq;

fn amara_parser() -> NotationParser {
    NotationParser::new(&InstrumentLayout::from_dto(e_amara()).expect("layout"))
}

fn note(id: &str) -> Note {
    Note::parse(id).expect("note")
}

fn pitch_ids(events: &[NoteEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match &event.kind {
            EventKind::Pitch { note } => Some(note.to_string()),
            _ => None,
        })
        .collect()
}

#[test]
fn group_divisor_halves_duration() {
    let events = amara_parser().parse("(A3 B3)/2");
    assert_eq!(events.len(), 2);
    assert_eq!(pitch_ids(&events), vec!["A3", "B3"]);
    assert!(events.iter().all(|event| event.duration == 0.5));
}

#[test]
fn comma_divisor_is_decimal() {
    let events = amara_parser().parse("(1 2 3)/1,5");
    assert_eq!(events.len(), 3);
    for event in &events {
        assert!((event.duration - 1.0 / 1.5).abs() < 1e-9);
    }
}

#[test]
fn unknown_tokens_are_dropped_and_reported() {
    let outcome = amara_parser().parse_with_diagnostics("E3 Z9 B3");
    assert_eq!(pitch_ids(&outcome.events), vec!["E3", "B3"]);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert_eq!(outcome.diagnostics[0].token, "Z9");
    assert_eq!(outcome.diagnostics[0].reason, DiagnosticReason::UnknownSymbol);
}

#[test]
fn numbers_follow_pitch_order_not_list_order() {
    let mut shuffled = BottomMap::new();
    shuffled.insert("E5", "B4");
    shuffled.insert("G3", "G4");
    shuffled.insert("F#3", "F#4");
    let mut dto = e_amara();
    dto.bottom = shuffled;
    let reordered = NotationParser::new(&InstrumentLayout::from_dto(dto).expect("layout"));

    let text = "1 2 3 11";
    let expected = vec!["F#3", "G3", "B3", "E5"];
    assert_eq!(pitch_ids(&amara_parser().parse(text)), expected);
    assert_eq!(pitch_ids(&reordered.parse(text)), expected);
}

#[test]
fn ding_aliases_resolve_to_lowest_ding() {
    let mut bottom = BottomMap::new();
    bottom.insert("D:C3", "E3");
    let layout =
        InstrumentLayout::new("low ding", vec!["E3".into(), "G3".into(), "B3".into()], bottom)
            .expect("layout");
    let parser = NotationParser::new(&layout);
    assert_eq!(pitch_ids(&parser.parse("D d 0")), vec!["C3", "C3", "C3"]);
    assert_eq!(pitch_ids(&parser.parse("1 2")), vec!["G3", "B3"]);
}

#[test]
fn degree_out_of_range_is_reported() {
    let outcome = amara_parser().parse_with_diagnostics("12");
    assert!(outcome.events.is_empty());
    assert_eq!(
        outcome.diagnostics[0].reason,
        DiagnosticReason::DegreeOutOfRange(12)
    );
}

#[test]
fn alternation_builds_simultaneous_group() {
    let events = amara_parser().parse("K|3");
    assert_eq!(
        events,
        vec![NoteEvent::new(EventKind::Group {
            alternatives: vec![
                Sound::Percussion {
                    hit: PercussionHit {
                        hand: PercussionHand::Kick,
                        ghost: false,
                    },
                },
                Sound::Pitch { note: note("B3") },
            ],
        })]
    );
}

#[test]
fn rests_inside_alternation_collapse() {
    let parser = amara_parser();
    assert_eq!(parser.parse("-|-"), vec![NoteEvent::rest()]);

    let events = parser.parse("T|-");
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0].kind,
        EventKind::Percussion {
            hit: PercussionHit {
                hand: PercussionHand::Tak,
                ghost: false
            }
        }
    ));
}

#[test]
fn lowercase_percussion_is_ghosted() {
    let events = amara_parser().parse("k t K");
    let ghosts: Vec<bool> = events
        .iter()
        .filter_map(|event| match event.kind {
            EventKind::Percussion { hit } => Some(hit.ghost),
            _ => None,
        })
        .collect();
    assert_eq!(ghosts, vec![true, true, false]);
}

#[test]
fn invalid_divisor_keeps_unit_duration() {
    let outcome = amara_parser().parse_with_diagnostics("(1 2)/0 (3)/1.5.2");
    assert_eq!(outcome.events.len(), 3);
    assert!(outcome.events.iter().all(|event| event.duration == 1.0));
    assert_eq!(
        outcome
            .diagnostics
            .iter()
            .map(|diag| diag.reason.clone())
            .collect::<Vec<_>>(),
        vec![
            DiagnosticReason::InvalidDivisor("0".into()),
            DiagnosticReason::InvalidDivisor("1.5.2".into()),
        ]
    );
}

#[test]
fn ding_marker_is_not_valid_notation() {
    let outcome = amara_parser().parse_with_diagnostics("D:E3");
    assert!(outcome.events.is_empty());
    assert_eq!(outcome.diagnostics[0].reason, DiagnosticReason::UnknownSymbol);
}

#[test]
fn blank_input_yields_nothing() {
    let outcome = amara_parser().parse_with_diagnostics(" \n\t ");
    assert!(outcome.events.is_empty());
    assert!(outcome.diagnostics.is_empty());
}
