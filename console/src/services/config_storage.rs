//! Config storage backends
//!
//! `FileConfigStorage` keeps every key in one JSON object on disk, written
//! through a temporary file and a rename. `MemoryConfigStorage` backs tests and
//! sessions that should leave no trace.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use shared::{process_debug, ProcessId};
use crate::error::{ConsoleError, ConsoleResult};
use crate::traits::ConfigStorage;

/// Default state file, relative to the working directory
pub const DEFAULT_STATE_FILE: &str = ".sv-console.json";

/// JSON file holding `key → raw text`
pub struct FileConfigStorage {
    path: PathBuf,
    /// Serializes read-modify-write cycles within the process
    write_lock: Mutex<()>,
}

impl FileConfigStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> ConsoleResult<BTreeMap<String, String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(ConsoleError::IoError(e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&text).map_err(|e| ConsoleError::Config {
            message: format!("state file {} is not a JSON object of strings: {}", self.path.display(), e),
        })
    }
}

impl ConfigStorage for FileConfigStorage {
    fn load(&self, key: &str) -> ConsoleResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> ConsoleResult<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // An unreadable file is replaced rather than blocking every later save
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(&entries)?)?;
        fs::rename(&temp_path, &self.path)?;

        process_debug!(ProcessId::current(), "💾 Saved {} to {}", key, self.path.display());
        Ok(())
    }
}

/// In-process storage
#[derive(Default)]
pub struct MemoryConfigStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStorage for MemoryConfigStorage {
    fn load(&self, key: &str) -> ConsoleResult<Option<String>> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn save(&self, key: &str, value: &str) -> ConsoleResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
