use crate::model::{EventKind, NoteEvent, Sound};
use crate::pitch::Note;

const DURATION_EPSILON: f64 = 1e-6;

fn sound_text(sound: &Sound) -> String {
    match sound {
        Sound::Pitch { note } => note.to_string(),
        Sound::Percussion { hit } => hit.symbol().to_string(),
    }
}

/// Notation for one event, ignoring its duration.
pub fn event_token(event: &NoteEvent) -> String {
    match &event.kind {
        EventKind::Pitch { note } => note.to_string(),
        EventKind::Percussion { hit } => hit.symbol().to_string(),
        EventKind::Rest => "-".to_string(),
        EventKind::Group { alternatives } => alternatives
            .iter()
            .map(sound_text)
            .collect::<Vec<_>>()
            .join("|"),
    }
}

fn same_duration(a: f64, b: f64) -> bool {
    (a - b).abs() < DURATION_EPSILON
}

/// Divisor text for a duration, e.g. `0.5` -> `2`, `0.666..` -> `1.5`.
fn divisor_text(duration: f64) -> String {
    let divisor = ((1.0 / duration) * 1000.0).round() / 1000.0;
    if (divisor - divisor.round()).abs() < DURATION_EPSILON {
        format!("{}", divisor.round() as i64)
    } else {
        let text = format!("{divisor:.3}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Rebuilds notation text from parsed events.
///
/// Lossy: degree numbers come back as pitch names and adjacent groups that
/// share a divisor merge into one. Prefer a step's stored source text.
pub fn events_to_text(events: &[NoteEvent]) -> String {
    let mut parts = Vec::new();
    let mut idx = 0;

    while idx < events.len() {
        let duration = events[idx].duration;
        let run_end = events[idx..]
            .iter()
            .position(|event| !same_duration(event.duration, duration))
            .map(|offset| idx + offset)
            .unwrap_or(events.len());
        let tokens = events[idx..run_end].iter().map(event_token);

        if same_duration(duration, 1.0) {
            parts.extend(tokens);
        } else {
            let inner = tokens.collect::<Vec<_>>().join(" ");
            parts.push(format!("({inner})/{}", divisor_text(duration)));
        }
        idx = run_end;
    }

    parts.join(" ")
}

/// Collapses whitespace runs to single spaces and spells pitch tokens the
/// way reconstruction prints them (`e3` -> `E3`, `bb3` -> `Bb3`). Percussion,
/// degree and ding symbols are left alone.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(normalize_token)
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut start = 0;
    for (idx, c) in token.char_indices() {
        if matches!(c, '(' | ')' | '|' | '/') {
            out.push_str(&canonical_pitch(&token[start..idx]));
            out.push(c);
            start = idx + c.len_utf8();
        }
    }
    out.push_str(&canonical_pitch(&token[start..]));
    out
}

fn canonical_pitch(part: &str) -> String {
    if part.contains(':') {
        return part.to_string();
    }
    match Note::parse(part) {
        Ok(note) => note.to_string(),
        Err(_) => part.to_string(),
    }
}
