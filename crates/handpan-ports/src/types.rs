use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub type AudioTime = f64; // seconds on the sink's monotonic audio clock

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoiceHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

/// Percussive stroke on the instrument body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PercussionHand {
    /// `K`: low body hit.
    Kick,
    /// `T`: bright rim tap, rendered with the alternate timbre.
    Tak,
}

impl PercussionHand {
    pub fn symbol(self) -> char {
        match self {
            PercussionHand::Kick => 'K',
            PercussionHand::Tak => 'T',
        }
    }

    pub fn is_alternate(self) -> bool {
        matches!(self, PercussionHand::Tak)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bpm(pub u32);

impl Bpm {
    pub const MIN: u32 = 20;
    pub const MAX: u32 = 300;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Length of one eighth note, the base unit of every event duration.
    pub fn eighth_note_secs(self) -> f64 {
        (60.0 / self.0 as f64) / 2.0
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(80)
    }
}

/// Bottom notes of a layout: note id -> structural parent id.
///
/// Serialized as a JSON object; entry order is preserved because it defines
/// the instrument's note order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BottomMap(pub Vec<(String, String)>);

impl BottomMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, id: impl Into<String>, parent: impl Into<String>) {
        let id = id.into();
        let parent = parent.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = parent,
            None => self.0.push((id, parent)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(id, parent)| (id.as_str(), parent.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for BottomMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, parent) in &self.0 {
            map.serialize_entry(id, parent)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BottomMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BottomMapVisitor;

        impl<'de> Visitor<'de> for BottomMapVisitor {
            type Value = BottomMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of note id to parent note id")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<BottomMap, A::Error> {
                let mut out = BottomMap::new();
                while let Some((id, parent)) = access.next_entry::<String, String>()? {
                    out.insert(id, parent);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(BottomMapVisitor)
    }
}

/// Raw instrument layout as exchanged with storage and the UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutDto {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub top: Vec<String>,
    #[serde(default)]
    pub bottom: BottomMap,
}
