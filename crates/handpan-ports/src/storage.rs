use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("composition not found: {0}")]
    NotFound(String),
}

/// One progression card in exported form. `text` is the authoritative
/// notation source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressionItemDto {
    pub name: String,
    pub text: String,
    /// Local repeat override; absent means the global default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeats: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionDto {
    pub layout: LayoutDto,
    #[serde(default)]
    pub progression: Vec<ProgressionItemDto>,
    #[serde(default)]
    pub tempo: Bpm,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositionDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub layout: LayoutDto,
    #[serde(default)]
    pub progression: Vec<ProgressionItemDto>,
    #[serde(default)]
    pub tempo: Bpm,
}

pub trait SessionStore: Send + Sync {
    fn load_session(&self) -> Result<Option<SessionDto>, StorageError>;
    fn save_session(&self, session: &SessionDto) -> Result<(), StorageError>;

    fn list_compositions(&self) -> Result<Vec<CompositionDto>, StorageError>;
    /// Replaces an entry with the same name and category, otherwise appends.
    fn save_composition(&self, composition: CompositionDto) -> Result<CompositionDto, StorageError>;
    fn delete_composition(&self, id: &str) -> Result<(), StorageError>;

    /// User-defined instrument layouts, in saved order.
    fn list_layouts(&self) -> Result<Vec<LayoutDto>, StorageError>;
    /// Replaces the entry with the same id, otherwise appends. A layout
    /// without an id gets one assigned.
    fn save_layout(&self, layout: LayoutDto) -> Result<LayoutDto, StorageError>;
    fn delete_layout(&self, id: &str) -> Result<(), StorageError>;
}
