use handpan_ports::storage::{CompositionDto, SessionDto, SessionStore, StorageError};
use handpan_ports::types::LayoutDto;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const APP_DIR: &str = "HandpanWorkbench";
const SESSION_FILE: &str = "session.json";
const COMPOSITIONS_FILE: &str = "compositions.json";
const LAYOUTS_FILE: &str = "layouts.json";
const LAYOUT_ID_PREFIX: &str = "custom-";

/// JSON files under one directory: the last session, the saved
/// compositions and the user's custom layouts.
pub struct FsStorage {
    base_dir: PathBuf,
    // serializes read-modify-write of the list files
    write_lock: Mutex<()>,
}

impl FsStorage {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn default_base_dir() -> Result<PathBuf, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(base.join(APP_DIR))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn session_path(&self) -> PathBuf {
        self.base_dir.join(SESSION_FILE)
    }

    fn compositions_path(&self) -> PathBuf {
        self.base_dir.join(COMPOSITIONS_FILE)
    }

    fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
        let data = fs::read(path).map_err(|e| StorageError::Io(e.to_string()))?;
        serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        let data =
            serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(path, data).map_err(|e| StorageError::Io(e.to_string()))
    }

    fn layouts_path(&self) -> PathBuf {
        self.base_dir.join(LAYOUTS_FILE)
    }

    /// Contents of a list file; a missing file is an empty list.
    fn read_list<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        Self::read_json(path)
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        let base_dir = Self::default_base_dir().unwrap_or_else(|err| {
            log::warn!("storage: {err}; falling back to working directory");
            PathBuf::from(".")
        });
        Self::new(base_dir)
    }
}

impl SessionStore for FsStorage {
    fn load_session(&self) -> Result<Option<SessionDto>, StorageError> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        Self::read_json(&path).map(Some)
    }

    fn save_session(&self, session: &SessionDto) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        Self::write_json(&self.session_path(), session)?;
        log::debug!(
            "storage: session saved ({} step(s))",
            session.progression.len()
        );
        Ok(())
    }

    fn list_compositions(&self) -> Result<Vec<CompositionDto>, StorageError> {
        Self::read_list(&self.compositions_path())
    }

    fn save_composition(
        &self,
        mut composition: CompositionDto,
    ) -> Result<CompositionDto, StorageError> {
        let _guard = self.write_lock.lock();
        let mut list: Vec<CompositionDto> = Self::read_list(&self.compositions_path())?;

        let existing = list.iter().position(|saved| {
            saved.name.eq_ignore_ascii_case(&composition.name)
                && saved.category.eq_ignore_ascii_case(&composition.category)
        });
        match existing {
            Some(index) => {
                composition.id = list[index].id.clone();
                list[index] = composition.clone();
            }
            None => {
                if composition.id.is_empty() {
                    let taken: Vec<&str> = list.iter().map(|saved| saved.id.as_str()).collect();
                    composition.id = next_id("", &taken);
                }
                list.push(composition.clone());
            }
        }

        Self::write_json(&self.compositions_path(), &list)?;
        log::debug!(
            "storage: composition '{}' saved as {}",
            composition.name,
            composition.id
        );
        Ok(composition)
    }

    fn delete_composition(&self, id: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut list: Vec<CompositionDto> = Self::read_list(&self.compositions_path())?;
        let before = list.len();
        list.retain(|saved| saved.id != id);
        if list.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Self::write_json(&self.compositions_path(), &list)
    }

    fn list_layouts(&self) -> Result<Vec<LayoutDto>, StorageError> {
        Self::read_list(&self.layouts_path())
    }

    fn save_layout(&self, mut layout: LayoutDto) -> Result<LayoutDto, StorageError> {
        let _guard = self.write_lock.lock();
        let mut list: Vec<LayoutDto> = Self::read_list(&self.layouts_path())?;

        let id = match layout.id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let taken: Vec<&str> = list.iter().filter_map(|saved| saved.id.as_deref()).collect();
                next_id(LAYOUT_ID_PREFIX, &taken)
            }
        };
        layout.id = Some(id.clone());

        match list.iter().position(|saved| saved.id.as_deref() == Some(id.as_str())) {
            Some(index) => list[index] = layout.clone(),
            None => list.push(layout.clone()),
        }

        Self::write_json(&self.layouts_path(), &list)?;
        log::debug!("storage: layout '{}' saved as {id}", layout.name);
        Ok(layout)
    }

    fn delete_layout(&self, id: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut list: Vec<LayoutDto> = Self::read_list(&self.layouts_path())?;
        let before = list.len();
        list.retain(|saved| saved.id.as_deref() != Some(id));
        if list.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Self::write_json(&self.layouts_path(), &list)
    }
}

/// `prefix` plus a millisecond timestamp, bumped past any id already in use.
fn next_id(prefix: &str, taken: &[&str]) -> String {
    let mut millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    loop {
        let id = format!("{prefix}{millis}");
        if !taken.contains(&id.as_str()) {
            return id;
        }
        millis += 1;
    }
}
