use serde::{Deserialize, Serialize};

/// Chord vocabulary. Declaration order is the matching order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordType {
    #[serde(rename = "5")]
    Power,
    Major,
    Minor,
    Diminished,
    Sus2,
    Sus4,
    Maj7,
    Min7,
    #[serde(rename = "7")]
    Dominant7,
    Dim7,
    Min7b5,
    #[serde(rename = "M3")]
    MajorThird,
    #[serde(rename = "m3")]
    MinorThird,
}

impl ChordType {
    pub const ALL: [ChordType; 13] = [
        ChordType::Power,
        ChordType::Major,
        ChordType::Minor,
        ChordType::Diminished,
        ChordType::Sus2,
        ChordType::Sus4,
        ChordType::Maj7,
        ChordType::Min7,
        ChordType::Dominant7,
        ChordType::Dim7,
        ChordType::Min7b5,
        ChordType::MajorThird,
        ChordType::MinorThird,
    ];

    /// Semitones above the root that must be present.
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Power => &[7],
            ChordType::Major => &[4, 7],
            ChordType::Minor => &[3, 7],
            ChordType::Diminished => &[3, 6],
            ChordType::Sus2 => &[2, 7],
            ChordType::Sus4 => &[5, 7],
            ChordType::Maj7 => &[4, 7, 11],
            ChordType::Min7 => &[3, 7, 10],
            ChordType::Dominant7 => &[4, 7, 10],
            ChordType::Dim7 => &[3, 6, 9],
            ChordType::Min7b5 => &[3, 6, 10],
            ChordType::MajorThird => &[4],
            ChordType::MinorThird => &[3],
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            ChordType::Power => "5",
            ChordType::Major => "Major",
            ChordType::Minor => "Minor",
            ChordType::Diminished => "Diminished",
            ChordType::Sus2 => "Sus2",
            ChordType::Sus4 => "Sus4",
            ChordType::Maj7 => "Maj7",
            ChordType::Min7 => "Min7",
            ChordType::Dominant7 => "7",
            ChordType::Dim7 => "Dim7",
            ChordType::Min7b5 => "Min7b5",
            ChordType::MajorThird => "M3",
            ChordType::MinorThird => "m3",
        }
    }

    /// Display ranking, lower first.
    pub fn priority(self) -> u8 {
        match self {
            ChordType::Minor => 1,
            ChordType::Major => 2,
            ChordType::Sus2 | ChordType::Sus4 => 3,
            ChordType::Power => 4,
            ChordType::Min7 | ChordType::Maj7 => 5,
            ChordType::Dominant7 => 6,
            ChordType::Diminished | ChordType::Dim7 | ChordType::Min7b5 => 7,
            ChordType::MajorThird | ChordType::MinorThird => 8,
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.symbol() == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for ty in ChordType::ALL {
            assert_eq!(ChordType::from_symbol(ty.symbol()), Some(ty));
        }
        assert_eq!(ChordType::from_symbol("maj9"), None);
    }

    #[test]
    fn sevenths_need_three_intervals() {
        assert_eq!(ChordType::Maj7.intervals().len(), 3);
        assert!(ChordType::ALL
            .iter()
            .filter(|ty| ty.priority() == 8)
            .all(|ty| ty.intervals().len() == 1));
    }
}
