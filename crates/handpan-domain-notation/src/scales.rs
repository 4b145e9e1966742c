use crate::layout::{InstrumentLayout, LayoutError};
use crate::pitch::{flat_name_for_pitch_class, note_name_for_pitch_class, NoteName};
use handpan_ports::types::{BottomMap, LayoutDto};

/// Octave the generated ding sits in.
pub const TEMPLATE_DING_OCTAVE: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleTemplate {
    pub name: &'static str,
    pub kind: &'static str,
    pub keys: &'static [&'static str],
    /// Semitones above the ding for each tone field.
    pub formula: &'static [u8],
}

pub const SCALE_TEMPLATES: &[ScaleTemplate] = &[
    ScaleTemplate {
        name: "Kurd",
        kind: "Natural Minor (Ding+8)",
        keys: &["D", "C#", "E", "B", "A", "G"],
        formula: &[7, 8, 10, 12, 14, 15, 17, 19],
    },
    ScaleTemplate {
        name: "Kurd 9",
        kind: "Natural Minor (Ding+9)",
        keys: &["D", "C#", "E", "B", "A", "G"],
        formula: &[7, 8, 10, 12, 14, 15, 17, 19, 22],
    },
    ScaleTemplate {
        name: "Amara",
        kind: "Celtic Minor",
        keys: &["D", "C#", "E", "B", "F", "G"],
        formula: &[7, 10, 12, 14, 15, 17, 19, 22],
    },
    ScaleTemplate {
        name: "Pygmy",
        kind: "Pentatonic",
        keys: &["F", "G", "E", "F#", "D"],
        formula: &[5, 7, 8, 12, 14, 15, 17, 19],
    },
    ScaleTemplate {
        name: "Hijaz",
        kind: "Phrygian Dominant",
        keys: &["D", "C#", "G", "F", "E"],
        formula: &[7, 8, 11, 12, 14, 15, 17, 19],
    },
    ScaleTemplate {
        name: "Integral",
        kind: "Minor Variant",
        keys: &["D", "C#", "C", "B"],
        formula: &[7, 8, 10, 12, 14, 15, 17],
    },
    ScaleTemplate {
        name: "Equinox",
        kind: "Minor",
        keys: &["E", "F", "G", "B", "C"],
        formula: &[3, 7, 8, 10, 12, 14, 15, 19],
    },
    ScaleTemplate {
        name: "Sabye",
        kind: "Major",
        keys: &["C", "D", "F", "G", "Bb"],
        formula: &[7, 9, 11, 12, 14, 16, 17, 19],
    },
    ScaleTemplate {
        name: "Mixolydian",
        kind: "Mixolydian",
        keys: &["D", "C", "G", "F", "A"],
        formula: &[7, 9, 10, 12, 14, 15, 17, 19],
    },
    ScaleTemplate {
        name: "Mystic",
        kind: "Minor",
        keys: &["D", "G", "A", "F", "C"],
        formula: &[5, 7, 10, 12, 14, 15, 17, 19],
    },
];

const MAJOR_FLAT_KEYS: &[&str] = &["F", "Bb", "Eb", "Ab", "Db", "Gb"];
const MINOR_FLAT_KEYS: &[&str] = &["C", "F", "Bb", "Eb", "Ab", "Db", "Gb", "D", "G", "A"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error("unknown scale template: {0}")]
    UnknownTemplate(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub fn find_template(name: &str) -> Option<&'static ScaleTemplate> {
    SCALE_TEMPLATES
        .iter()
        .find(|template| template.name.eq_ignore_ascii_case(name))
}

impl ScaleTemplate {
    fn is_major(&self) -> bool {
        ["Major", "Mixolydian", "Dominant"]
            .iter()
            .any(|word| self.kind.contains(word))
    }

    fn prefers_flats(&self, key: &str) -> bool {
        if self.is_major() {
            MAJOR_FLAT_KEYS.contains(&key)
        } else {
            MINOR_FLAT_KEYS.contains(&key)
        }
    }

    /// Builds a top-only layout with the ding on `<key>3`.
    ///
    /// Side notes alternate letters where possible: when a pitch has both a
    /// sharp and a flat spelling, the one whose letter differs from the
    /// previous note wins; otherwise the key's sharp/flat preference decides.
    pub fn build_layout(&self, key: &str) -> Result<InstrumentLayout, ScaleError> {
        let key_name = NoteName::parse(key).ok_or_else(|| ScaleError::InvalidKey(key.to_string()))?;
        let use_flats = self.prefers_flats(key);
        let root = key_name.semitone() as u32;

        let ding = format!("{key_name}{TEMPLATE_DING_OCTAVE}");
        let mut previous_letter = key_name.letter;
        let mut top = vec![ding];

        for &semitones in self.formula {
            let absolute = root + semitones as u32;
            let octave = TEMPLATE_DING_OCTAVE as u32 + absolute / 12;
            let pitch_class = (absolute % 12) as u8;

            let sharp = note_name_for_pitch_class(pitch_class);
            let flat = flat_name_for_pitch_class(pitch_class);
            let chosen = if sharp == flat {
                sharp
            } else if sharp.letter == previous_letter {
                flat
            } else if flat.letter == previous_letter {
                sharp
            } else if use_flats {
                flat
            } else {
                sharp
            };

            previous_letter = chosen.letter;
            top.push(format!("{chosen}{octave}"));
        }

        let id = format!("gen-{}-{}", self.name, key)
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");

        let layout = InstrumentLayout::from_dto(LayoutDto {
            id: Some(id),
            name: format!("{} {}", key, self.name),
            top,
            bottom: BottomMap::new(),
        })?;
        Ok(layout)
    }
}

/// Built-in E Amara layout.
pub fn e_amara() -> LayoutDto {
    let mut bottom = BottomMap::new();
    bottom.insert("F#3", "F#4");
    bottom.insert("G3", "G4");
    bottom.insert("E5", "B4");
    LayoutDto {
        id: Some("e-amara".to_string()),
        ..e_amara_shape("E Amara", bottom)
    }
}

/// Built-in layouts offered next to the user's custom ones.
pub fn predefined_layouts() -> Vec<LayoutDto> {
    vec![e_amara()]
}

pub const STARTER_LAYOUT_ID: &str = "custom-alex-amara";
pub const STARTER_LAYOUT_NAME: &str = "Alex E Amara";

/// Starter custom layout: E Amara with F#3 and G3 marked as extra dings.
pub fn alex_e_amara() -> LayoutDto {
    let mut bottom = BottomMap::new();
    bottom.insert("D:F#3", "F#4");
    bottom.insert("D:G3", "G4");
    bottom.insert("E5", "B4");
    LayoutDto {
        id: Some(STARTER_LAYOUT_ID.to_string()),
        ..e_amara_shape(STARTER_LAYOUT_NAME, bottom)
    }
}

fn e_amara_shape(name: &str, bottom: BottomMap) -> LayoutDto {
    LayoutDto {
        id: None,
        name: name.to_string(),
        top: ["E3", "B3", "D4", "E4", "F#4", "G4", "A4", "B4", "D5"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        bottom,
    }
}

/// The starter layout as it should be stored next to `custom`: it takes
/// over the id of an entry carrying its id or, failing that, its name.
pub fn starter_layout_for(custom: &[LayoutDto]) -> LayoutDto {
    let mut starter = alex_e_amara();
    let existing = custom
        .iter()
        .find(|layout| layout.id.as_deref() == Some(STARTER_LAYOUT_ID))
        .or_else(|| custom.iter().find(|layout| layout.name == STARTER_LAYOUT_NAME));
    if let Some(id) = existing.and_then(|layout| layout.id.clone()) {
        starter.id = Some(id);
    }
    starter
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(layout: &InstrumentLayout) -> Vec<String> {
        layout.slots().iter().map(|slot| slot.id.clone()).collect()
    }

    #[test]
    fn d_kurd_spells_with_flats() {
        let layout = find_template("kurd").unwrap().build_layout("D").unwrap();
        assert_eq!(layout.name(), "D Kurd");
        assert_eq!(
            ids(&layout),
            vec!["D3", "A3", "Bb3", "C4", "D4", "E4", "F4", "G4", "A4"]
        );
        assert_eq!(layout.id(), Some("gen-kurd-d"));
    }

    #[test]
    fn e_kurd_spells_with_sharps() {
        let layout = find_template("Kurd").unwrap().build_layout("E").unwrap();
        assert_eq!(
            ids(&layout),
            vec!["E3", "B3", "C4", "D4", "E4", "F#4", "G4", "A4", "B4"]
        );
    }

    #[test]
    fn builtin_amara_is_valid() {
        let layout = InstrumentLayout::from_dto(e_amara()).unwrap();
        assert_eq!(layout.notes().len(), 12);
    }

    #[test]
    fn starter_layout_marks_extra_dings() {
        let layout = InstrumentLayout::from_dto(alex_e_amara()).unwrap();
        let numbering = layout.numbering();
        let dings: Vec<String> = numbering.dings.iter().map(|n| n.to_string()).collect();
        assert_eq!(dings, vec!["E3", "F#3", "G3"]);
        assert_eq!(numbering.resolve_number(1).unwrap().to_string(), "B3");
        assert_eq!(numbering.tone_circle.len(), 9);
    }

    #[test]
    fn starter_layout_takes_over_existing_id() {
        assert_eq!(starter_layout_for(&[]).id.as_deref(), Some(STARTER_LAYOUT_ID));

        let mut renamed = alex_e_amara();
        renamed.id = Some("custom-1700000000000".into());
        renamed.top.pop();
        let starter = starter_layout_for(&[e_amara(), renamed]);
        assert_eq!(starter.id.as_deref(), Some("custom-1700000000000"));
        assert_eq!(starter.top.len(), 9);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = find_template("Pygmy").unwrap().build_layout("H").unwrap_err();
        assert_eq!(err, ScaleError::InvalidKey("H".into()));
    }
}
