use crate::pitch::Note;
use handpan_ports::types::PercussionHand;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PercussionHit {
    pub hand: PercussionHand,
    pub ghost: bool,
}

impl PercussionHit {
    pub fn symbol(&self) -> char {
        let symbol = self.hand.symbol();
        if self.ghost {
            symbol.to_ascii_lowercase()
        } else {
            symbol
        }
    }
}

/// One member of a simultaneous group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Sound {
    Pitch { note: Note },
    Percussion { hit: PercussionHit },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Pitch { note: Note },
    Percussion { hit: PercussionHit },
    Rest,
    /// Every alternative starts at the same onset.
    Group { alternatives: Vec<Sound> },
}

/// A timed notation event. `duration` is a multiple of the eighth-note base
/// unit and is always positive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub kind: EventKind,
    pub duration: f64,
}

impl NoteEvent {
    pub fn new(kind: EventKind) -> Self {
        Self { kind, duration: 1.0 }
    }

    pub fn pitch(note: Note) -> Self {
        Self::new(EventKind::Pitch { note })
    }

    pub fn rest() -> Self {
        Self::new(EventKind::Rest)
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
        self
    }

    /// Every sound this event triggers at its onset.
    pub fn sounds(&self) -> Vec<Sound> {
        match &self.kind {
            EventKind::Pitch { note } => vec![Sound::Pitch { note: *note }],
            EventKind::Percussion { hit } => vec![Sound::Percussion { hit: *hit }],
            EventKind::Rest => Vec::new(),
            EventKind::Group { alternatives } => alternatives.clone(),
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self.kind, EventKind::Rest)
    }
}

impl From<Sound> for EventKind {
    fn from(sound: Sound) -> Self {
        match sound {
            Sound::Pitch { note } => EventKind::Pitch { note },
            Sound::Percussion { hit } => EventKind::Percussion { hit },
        }
    }
}
