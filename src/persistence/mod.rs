//! Best score persistence
//!
//! Stores:
//! - `MemoryStore`: process-local, shared between clones (tests, headless runs)
//! - `JsonFileStore`: JSON envelope on disk (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm)
//!
//! The simulation never retries or verifies a write. Failures are logged and dropped.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors inside a store; they never cross the `BestScoreStore` boundary
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored best score is malformed: {0}")]
    Format(#[from] serde_json::Error),
    #[error("storage is unavailable")]
    Unavailable,
}

/// Get-or-default / set contract for the persisted best score
pub trait BestScoreStore {
    /// Persisted best, or 0 when nothing (valid) is stored
    fn load(&self) -> u32;
    /// Persist a new best; failures are swallowed
    fn save(&mut self, best: u32);
}

/// On-disk / on-storage representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScoreRecord {
    pub version: u32,
    pub best: u32,
}

impl BestScoreRecord {
    pub const VERSION: u32 = 1;

    pub fn new(best: u32) -> Self {
        Self {
            version: Self::VERSION,
            best,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Accepts the versioned record or a bare integer (older saves)
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let trimmed = json.trim();
        if let Ok(best) = trimmed.parse::<u32>() {
            return Ok(Self::new(best));
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

/// In-memory store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<Cell<Option<u32>>>,
    saves: Rc<Cell<u32>>,
}

impl MemoryStore {
    pub fn with_best(best: u32) -> Self {
        let store = Self::default();
        store.slot.set(Some(best));
        store
    }

    /// Last persisted value, if any
    pub fn saved(&self) -> Option<u32> {
        self.slot.get()
    }

    /// Number of writes performed
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> u32 {
        self.slot.get().unwrap_or(0)
    }

    fn save(&mut self, best: u32) {
        self.slot.set(Some(best));
        self.saves.set(self.saves.get() + 1);
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_load(&self) -> Result<Option<BestScoreRecord>, PersistError> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) => Ok(Some(BestScoreRecord::from_json(&json)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write to a temp file, then rename over the save
    fn try_save(&self, best: u32) -> Result<(), PersistError> {
        let json = BestScoreRecord::new(best).to_json()?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> u32 {
        match self.try_load() {
            Ok(record) => record.map(|r| r.best).unwrap_or(0),
            Err(e) => {
                log::warn!("Ignoring best score at {}: {}", self.path.display(), e);
                0
            }
        }
    }

    fn save(&mut self, best: u32) {
        if let Err(e) = self.try_save(best) {
            log::warn!("Failed to save best score to {}: {}", self.path.display(), e);
        }
    }
}

/// Browser LocalStorage store
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    /// LocalStorage key used by the game
    pub const DEFAULT_KEY: &'static str = "ff_best";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn try_load(&self) -> Result<Option<BestScoreRecord>, PersistError> {
        match crate::platform::storage_get(&self.key)? {
            Some(json) => Ok(Some(BestScoreRecord::from_json(&json)?)),
            None => Ok(None),
        }
    }

    fn try_save(&self, best: u32) -> Result<(), PersistError> {
        let json = BestScoreRecord::new(best).to_json()?;
        crate::platform::storage_set(&self.key, &json)
    }
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_KEY)
    }
}

impl BestScoreStore for LocalStorageStore {
    fn load(&self) -> u32 {
        match self.try_load() {
            Ok(record) => record.map(|r| r.best).unwrap_or(0),
            Err(e) => {
                log::warn!("Ignoring stored best score: {}", e);
                0
            }
        }
    }

    fn save(&mut self, best: u32) {
        match self.try_save(best) {
            Ok(()) => log::info!("Best score saved ({})", best),
            Err(e) => log::warn!("Failed to save best score: {}", e),
        }
    }
}
