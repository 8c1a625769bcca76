//! Persistent key/value preference store.
//!
//! The timer keeps its settings and the round counter log in a flat
//! string-keyed store. Two implementations are provided:
//!
//! - [`JsonPreferenceStore`]: a JSON object file, rewritten on every set
//! - [`MemoryPreferenceStore`]: process-local, for tests
//!
//! Reads never fail: a missing key or a value of the wrong type yields the
//! fallback (or an empty list).

mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use error::PreferenceError;

/// Application directory name under the platform config directory.
const APP_DIR: &str = "work-break-timer";

/// File name of the preference store.
const PREFS_FILE: &str = "preferences.json";

/// Trait for key/value preference storage.
///
/// Implementations must be shareable between the UI thread and the timer
/// task.
pub trait PreferenceStore: Send + Sync {
    /// Returns the integer stored under `key`, or `fallback`.
    fn get_int(&self, key: &str, fallback: i64) -> i64;

    /// Stores an integer under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted.
    fn set_int(&self, key: &str, value: i64) -> Result<(), PreferenceError>;

    /// Returns the ordered string list stored under `key` (empty if absent).
    fn get_string_list(&self, key: &str) -> Vec<String>;

    /// Replaces the string list stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be persisted.
    fn set_string_list(&self, key: &str, values: &[String]) -> Result<(), PreferenceError>;

    /// Re-reads values changed outside this process.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn reload(&self) -> Result<(), PreferenceError> {
        Ok(())
    }
}

/// Returns the default preference file location.
///
/// # Errors
///
/// Returns `PreferenceError::NoConfigDir` if the platform has no config
/// directory.
pub fn default_preferences_path() -> Result<PathBuf, PreferenceError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(PREFS_FILE))
        .ok_or(PreferenceError::NoConfigDir)
}

fn read_map(path: &Path) -> Result<Map<String, Value>, PreferenceError> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(Map::new()),
        Ok(content) => serde_json::from_str(&content).map_err(|source| PreferenceError::Parse {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
        Err(source) => Err(PreferenceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn int_from(map: &Map<String, Value>, key: &str, fallback: i64) -> i64 {
    map.get(key).and_then(Value::as_i64).unwrap_or(fallback)
}

fn list_from(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(String::from))
            .collect(),
        _ => Vec::new(),
    }
}

fn list_value(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

// ============================================================================
// JsonPreferenceStore
// ============================================================================

/// Preference store backed by a JSON object file.
///
/// The whole object is held in memory and written back after each set.
#[derive(Debug)]
pub struct JsonPreferenceStore {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl JsonPreferenceStore {
    /// Opens the store at `path`.
    ///
    /// A missing or empty file is treated as an empty store; the file is
    /// created on the first set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferenceError> {
        let path = path.into();
        let values = read_map(&path)?;

        debug!(path = %path.display(), keys = values.len(), "Preferences loaded");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Opens the store at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns an error if no config directory exists or the file is invalid.
    pub fn open_default() -> Result<Self, PreferenceError> {
        Self::open(default_preferences_path()?)
    }

    /// Returns the location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, key: &str, value: Value) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        // Pick up edits made by other processes before writing back.
        match read_map(&self.path) {
            Ok(on_disk) => *values = on_disk,
            Err(e) => warn!(error = %e, "Keeping in-memory preferences"),
        }
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn persist(&self, values: &Map<String, Value>) -> Result<(), PreferenceError> {
        let io_err = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(values).map_err(|source| {
            PreferenceError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        // Write beside the target and rename so a crash never leaves half a file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), "Preferences saved");
        Ok(())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn reload(&self) -> Result<(), PreferenceError> {
        let fresh = read_map(&self.path)?;
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        *values = fresh;
        debug!(path = %self.path.display(), "Preferences reloaded");
        Ok(())
    }

    fn get_int(&self, key: &str, fallback: i64) -> i64 {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        int_from(&values, key, fallback)
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), PreferenceError> {
        self.update(key, Value::from(value))
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        list_from(&values, key)
    }

    fn set_string_list(&self, key: &str, values: &[String]) -> Result<(), PreferenceError> {
        self.update(key, list_value(values))
    }
}

// ============================================================================
// MemoryPreferenceStore
// ============================================================================

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<Map<String, Value>>,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_int(&self, key: &str, fallback: i64) -> i64 {
        int_from(&self.values.lock().unwrap(), key, fallback)
    }

    fn set_int(&self, key: &str, value: i64) -> Result<(), PreferenceError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), Value::from(value));
        Ok(())
    }

    fn get_string_list(&self, key: &str) -> Vec<String> {
        list_from(&self.values.lock().unwrap(), key)
    }

    fn set_string_list(&self, key: &str, values: &[String]) -> Result<(), PreferenceError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), list_value(values));
        Ok(())
    }
}
