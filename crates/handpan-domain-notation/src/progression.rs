use crate::model::NoteEvent;
use crate::parser::{NotationParser, ParseDiagnostic};
use crate::text::events_to_text;
use handpan_ports::storage::ProgressionItemDto;
use serde::{Deserialize, Serialize};

/// One card of a progression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionStep {
    pub label: String,
    /// Authoritative notation; `None` for steps built straight from events.
    pub source_text: Option<String>,
    pub events: Vec<NoteEvent>,
    /// Local override of the global repeat count.
    pub repeat_count: Option<u32>,
}

impl ProgressionStep {
    pub fn from_text(
        label: impl Into<String>,
        text: impl Into<String>,
        parser: &NotationParser,
        repeat_count: Option<u32>,
    ) -> (Self, Vec<ParseDiagnostic>) {
        let text = text.into();
        let outcome = parser.parse_with_diagnostics(&text);
        let step = Self {
            label: label.into(),
            source_text: Some(text),
            events: outcome.events,
            repeat_count: repeat_count.filter(|count| *count > 0),
        };
        (step, outcome.diagnostics)
    }

    pub fn from_events(label: impl Into<String>, events: Vec<NoteEvent>) -> Self {
        Self {
            label: label.into(),
            source_text: None,
            events,
            repeat_count: None,
        }
    }

    pub fn from_item(item: &ProgressionItemDto, parser: &NotationParser) -> (Self, Vec<ParseDiagnostic>) {
        Self::from_text(item.name.clone(), item.text.clone(), parser, item.repeats)
    }

    /// Source text when present, otherwise a reconstruction from the events.
    pub fn text(&self) -> String {
        match &self.source_text {
            Some(text) => text.clone(),
            None => events_to_text(&self.events),
        }
    }

    pub fn effective_repeats(&self, default_repeats: u32) -> u32 {
        self.repeat_count.unwrap_or(default_repeats).max(1)
    }

    /// Re-derives events from the source text against a new layout. Steps
    /// without source text keep their events.
    pub fn reparse(&mut self, parser: &NotationParser) -> Vec<ParseDiagnostic> {
        let Some(text) = self.source_text.as_deref() else {
            return Vec::new();
        };
        let outcome = parser.parse_with_diagnostics(text);
        self.events = outcome.events;
        outcome.diagnostics
    }

    pub fn to_item(&self) -> ProgressionItemDto {
        ProgressionItemDto {
            name: self.label.clone(),
            text: self.text(),
            repeats: self.repeat_count,
        }
    }
}

/// Default card label for the step at `index`: `A`..`Z`, then `A2`, `B2`, ...
pub fn default_step_label(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    if index >= 26 {
        format!("{letter}{}", index / 26 + 1)
    } else {
        letter.to_string()
    }
}
