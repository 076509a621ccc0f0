use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use tracing::debug;

use crate::dream::Dream;
use crate::errors::{JournalError, JournalResult};

/// A single durable slot holding the whole serialized journal.
pub trait JournalStore: Send + Sync + Debug {
    /// Reads the slot. An absent slot is an empty journal.
    fn load(&self) -> JournalResult<Vec<Dream>>;

    /// Overwrites the slot with `dreams`.
    fn save(&self, dreams: &[Dream]) -> JournalResult<()>;
}

fn parse_slot(content: &str) -> JournalResult<Vec<Dream>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(content)?)
}

/// Journal slot backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileJournalStore {
    path: PathBuf,
}

impl FileJournalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl JournalStore for FileJournalStore {
    fn load(&self) -> JournalResult<Vec<Dream>> {
        if !self.path.exists() {
            debug!("Journal file {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        parse_slot(&content)
    }

    fn save(&self, dreams: &[Dream]) -> JournalResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(dreams)?;

        // Readers never observe a half-written slot
        let mut tmp_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                JournalError::Storage(format!("Invalid journal path: {}", self.path.display()))
            })?
            .to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("Wrote {} dreams to {}", dreams.len(), self.path.display());
        Ok(())
    }
}

/// Journal slot kept in memory as serialized JSON.
#[derive(Debug, Default)]
pub struct InMemoryJournalStore {
    slot: RwLock<Option<String>>,
    read_only: bool,
}

impl InMemoryJournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose slot already holds `raw`, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
            read_only: false,
        }
    }

    /// Store that rejects every write.
    pub fn read_only() -> Self {
        Self {
            slot: RwLock::new(None),
            read_only: true,
        }
    }

    /// Current serialized slot content.
    pub fn raw(&self) -> Option<String> {
        self.slot.read().ok().and_then(|slot| slot.clone())
    }
}

impl JournalStore for InMemoryJournalStore {
    fn load(&self) -> JournalResult<Vec<Dream>> {
        let slot = self.slot.read().map_err(|e| {
            JournalError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        match slot.as_deref() {
            Some(content) => parse_slot(content),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, dreams: &[Dream]) -> JournalResult<()> {
        if self.read_only {
            return Err(JournalError::Storage("journal slot is read-only".to_string()));
        }
        let content = serde_json::to_string(dreams)?;
        let mut slot = self.slot.write().map_err(|e| {
            JournalError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *slot = Some(content);
        Ok(())
    }
}

impl<T: JournalStore + ?Sized> JournalStore for Box<T> {
    fn load(&self) -> JournalResult<Vec<Dream>> {
        (**self).load()
    }

    fn save(&self, dreams: &[Dream]) -> JournalResult<()> {
        (**self).save(dreams)
    }
}

impl<T: JournalStore + ?Sized> JournalStore for std::sync::Arc<T> {
    fn load(&self) -> JournalResult<Vec<Dream>> {
        (**self).load()
    }

    fn save(&self, dreams: &[Dream]) -> JournalResult<()> {
        (**self).save(dreams)
    }
}
