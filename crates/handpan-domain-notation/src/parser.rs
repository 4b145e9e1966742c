//! Rhythm notation parser.
//!
//! Turns shorthand such as `D (1 2)/2 K|3 - t` into timed [`NoteEvent`]s.
//! Tokens that do not resolve are dropped; [`NotationParser::parse_with_diagnostics`]
//! reports what was dropped and why.

use crate::layout::{InstrumentLayout, NumberedLayout};
use crate::model::{EventKind, NoteEvent, PercussionHit, Sound};
use crate::pitch::Note;
use handpan_ports::types::PercussionHand;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]+\)/[\d.,]+|\S+").expect("valid token pattern"));
static GROUP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([^)]+)\)/([\d.,]+)$").expect("valid group pattern"));

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum DiagnosticReason {
    UnknownSymbol,
    EmptyAlternative,
    DegreeOutOfRange(usize),
    NoDing,
    /// The group still parses, with divisor 1.
    InvalidDivisor(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub token: String,
    pub reason: DiagnosticReason,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ParseOutcome {
    pub events: Vec<NoteEvent>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

enum Resolved {
    Sound(Sound),
    Rest,
}

/// Parser bound to one layout's numeric view. Rebuild it when the layout changes.
#[derive(Clone, Debug, Default)]
pub struct NotationParser {
    numbering: NumberedLayout,
}

impl NotationParser {
    pub fn new(layout: &InstrumentLayout) -> Self {
        Self::from_numbering(layout.numbering())
    }

    pub fn from_numbering(numbering: NumberedLayout) -> Self {
        Self { numbering }
    }

    pub fn numbering(&self) -> &NumberedLayout {
        &self.numbering
    }

    /// Best-effort parse. Never fails; unresolvable tokens vanish.
    pub fn parse(&self, text: &str) -> Vec<NoteEvent> {
        self.parse_with_diagnostics(text).events
    }

    pub fn parse_with_diagnostics(&self, text: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        for token in TOKEN_PATTERN.find_iter(text).map(|m| m.as_str()) {
            if let Some(group) = GROUP_PATTERN.captures(token) {
                let raw_divisor = &group[2];
                let duration = match parse_divisor(raw_divisor) {
                    Some(divisor) => 1.0 / divisor,
                    None => {
                        outcome.diagnostics.push(ParseDiagnostic {
                            token: token.to_string(),
                            reason: DiagnosticReason::InvalidDivisor(raw_divisor.to_string()),
                        });
                        1.0
                    }
                };

                for sub in group[1].split_whitespace() {
                    if let Some(event) = self.parse_bare(sub, &mut outcome.diagnostics) {
                        outcome.events.push(event.with_duration(duration));
                    }
                }
            } else if let Some(event) = self.parse_bare(token, &mut outcome.diagnostics) {
                outcome.events.push(event);
            }
        }

        if !outcome.diagnostics.is_empty() {
            log::debug!(
                "notation: {} event(s), {} diagnostic(s) for {:?}",
                outcome.events.len(),
                outcome.diagnostics.len(),
                text
            );
        }
        outcome
    }

    fn parse_bare(&self, token: &str, diagnostics: &mut Vec<ParseDiagnostic>) -> Option<NoteEvent> {
        let mut sounds = Vec::new();
        let mut saw_rest = false;

        for part in token.split('|') {
            match self.resolve_alternative(part.trim()) {
                Ok(Resolved::Sound(sound)) => sounds.push(sound),
                Ok(Resolved::Rest) => saw_rest = true,
                Err(reason) => diagnostics.push(ParseDiagnostic {
                    token: part.to_string(),
                    reason,
                }),
            }
        }

        match sounds.len() {
            0 if saw_rest => Some(NoteEvent::rest()),
            0 => None,
            1 => Some(NoteEvent::new(EventKind::from(sounds[0]))),
            _ => Some(NoteEvent::new(EventKind::Group {
                alternatives: sounds,
            })),
        }
    }

    fn resolve_alternative(&self, raw: &str) -> Result<Resolved, DiagnosticReason> {
        if raw.is_empty() {
            return Err(DiagnosticReason::EmptyAlternative);
        }

        if let Some(hit) = percussion(raw) {
            return Ok(Resolved::Sound(Sound::Percussion { hit }));
        }

        if raw == "-" {
            return Ok(Resolved::Rest);
        }

        if raw.eq_ignore_ascii_case("d") || raw == "0" {
            return self
                .numbering
                .resolve_ding()
                .map(|note| Resolved::Sound(Sound::Pitch { note }))
                .ok_or(DiagnosticReason::NoDing);
        }

        if raw.bytes().all(|b| b.is_ascii_digit()) {
            let number = raw.parse::<usize>().unwrap_or(usize::MAX);
            return self
                .numbering
                .resolve_number(number)
                .map(|note| Resolved::Sound(Sound::Pitch { note }))
                .ok_or(DiagnosticReason::DegreeOutOfRange(number));
        }

        if raw.contains(':') {
            return Err(DiagnosticReason::UnknownSymbol);
        }

        Note::parse(raw)
            .map(|note| Resolved::Sound(Sound::Pitch { note }))
            .map_err(|_| DiagnosticReason::UnknownSymbol)
    }
}

fn percussion(raw: &str) -> Option<PercussionHit> {
    let (hand, ghost) = match raw {
        "K" => (PercussionHand::Kick, false),
        "k" => (PercussionHand::Kick, true),
        "T" => (PercussionHand::Tak, false),
        "t" => (PercussionHand::Tak, true),
        _ => return None,
    };
    Some(PercussionHit { hand, ghost })
}

/// Group divisor; comma is accepted as decimal separator. `None` when the
/// value is not a positive number.
fn parse_divisor(raw: &str) -> Option<f64> {
    raw.replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|divisor| divisor.is_finite() && *divisor > 0.0)
}

/// One-shot parse against a layout.
pub fn parse_rhythm(text: &str, layout: &InstrumentLayout) -> Vec<NoteEvent> {
    NotationParser::new(layout).parse(text)
}
