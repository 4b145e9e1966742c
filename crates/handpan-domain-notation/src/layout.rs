use crate::pitch::{Note, PitchError};
use handpan_ports::types::{BottomMap, LayoutDto};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DING_PREFIX: &str = "D:";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout has no top notes")]
    Empty,
    #[error("invalid note id '{id}': {source}")]
    InvalidNote {
        id: String,
        #[source]
        source: PitchError,
    },
    #[error("duplicate note id: {0}")]
    DuplicateNote(String),
    #[error("bottom note '{id}' references unknown parent '{parent}'")]
    UnknownParent { id: String, parent: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotPosition {
    Top(usize),
    Bottom(usize),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutSlot {
    /// Note id with any `D:` marker stripped.
    pub id: String,
    pub note: Note,
    /// Flagged with `D:` as an additional fundamental.
    pub extra_ding: bool,
    pub parent: Option<String>,
    pub position: SlotPosition,
}

/// Validated instrument layout. The first top slot is the primary ding.
#[derive(Clone, Debug, PartialEq)]
pub struct InstrumentLayout {
    id: Option<String>,
    name: String,
    slots: Vec<LayoutSlot>,
    source: LayoutDto,
}

impl InstrumentLayout {
    pub fn new(
        name: impl Into<String>,
        top: Vec<String>,
        bottom: BottomMap,
    ) -> Result<Self, LayoutError> {
        Self::from_dto(LayoutDto {
            id: None,
            name: name.into(),
            top,
            bottom,
        })
    }

    pub fn from_dto(dto: LayoutDto) -> Result<Self, LayoutError> {
        if dto.top.is_empty() {
            return Err(LayoutError::Empty);
        }

        let mut slots = Vec::with_capacity(dto.top.len() + dto.bottom.len());
        let mut seen = HashSet::new();

        let top = dto
            .top
            .iter()
            .enumerate()
            .map(|(idx, raw)| (raw.as_str(), None::<&str>, SlotPosition::Top(idx)));
        let bottom = dto
            .bottom
            .iter()
            .enumerate()
            .map(|(idx, (raw, parent))| (raw, Some(parent), SlotPosition::Bottom(idx)));

        for (raw, parent, position) in top.chain(bottom) {
            let (id, extra_ding) = split_ding_marker(raw);
            let note = Note::parse(id).map_err(|source| LayoutError::InvalidNote {
                id: raw.to_string(),
                source,
            })?;
            if !seen.insert(id.to_string()) {
                return Err(LayoutError::DuplicateNote(id.to_string()));
            }
            slots.push(LayoutSlot {
                id: id.to_string(),
                note,
                extra_ding,
                parent: parent.map(|p| split_ding_marker(p).0.to_string()),
                position,
            });
        }

        for slot in &slots {
            if let Some(parent) = &slot.parent {
                if !seen.contains(parent) {
                    return Err(LayoutError::UnknownParent {
                        id: slot.id.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }

        Ok(Self {
            id: dto.id.clone(),
            name: dto.name.clone(),
            slots,
            source: dto,
        })
    }

    pub fn to_dto(&self) -> LayoutDto {
        self.source.clone()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[LayoutSlot] {
        &self.slots
    }

    pub fn primary_ding(&self) -> &LayoutSlot {
        &self.slots[0]
    }

    /// Instrument notes in layout order: top list, then bottom entries.
    pub fn notes(&self) -> Vec<Note> {
        self.slots.iter().map(|slot| slot.note).collect()
    }

    /// Primary ding followed by every `D:` flagged note, in layout order.
    pub fn ding_names(&self) -> Vec<String> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(idx, slot)| *idx == 0 || slot.extra_ding)
            .map(|(_, slot)| slot.id.clone())
            .collect()
    }

    pub fn numbering(&self) -> NumberedLayout {
        NumberedLayout::from_layout(self)
    }
}

fn split_ding_marker(raw: &str) -> (&str, bool) {
    match raw.strip_prefix(DING_PREFIX) {
        Some(rest) => (rest, true),
        None => (raw, false),
    }
}

/// Numeric addressing view: dings (`D` / `0`) and the tone circle (`1..N`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NumberedLayout {
    /// Primary ding first, then other flagged dings ascending by pitch.
    pub dings: Vec<Note>,
    /// Remaining notes ascending by pitch.
    pub tone_circle: Vec<Note>,
}

impl NumberedLayout {
    fn from_layout(layout: &InstrumentLayout) -> Self {
        let slots = layout.slots();
        let Some(primary) = slots.first() else {
            return Self::default();
        };

        let mut extra: Vec<Note> = slots[1..]
            .iter()
            .filter(|slot| slot.extra_ding)
            .map(|slot| slot.note)
            .collect();
        extra.sort_by_key(|note| note.value);

        let mut dings = vec![primary.note];
        dings.extend(extra);

        let mut tone_circle: Vec<Note> = slots[1..]
            .iter()
            .filter(|slot| !slot.extra_ding)
            .map(|slot| slot.note)
            .collect();
        tone_circle.sort_by_key(|note| note.value);

        Self { dings, tone_circle }
    }

    /// Lowest-pitched ding.
    pub fn resolve_ding(&self) -> Option<Note> {
        self.dings.iter().min_by_key(|note| note.value).copied()
    }

    /// 1-based tone circle lookup.
    pub fn resolve_number(&self, number: usize) -> Option<Note> {
        number
            .checked_sub(1)
            .and_then(|idx| self.tone_circle.get(idx))
            .copied()
    }

    /// Numeric label of a note: `D` for dings, its tone circle number otherwise.
    pub fn label_for(&self, note: &Note) -> Option<String> {
        if self.dings.iter().any(|ding| ding.same_pitch(note)) {
            return Some("D".to_string());
        }
        self.tone_circle
            .iter()
            .position(|tone| tone.same_pitch(note))
            .map(|idx| (idx + 1).to_string())
    }
}
