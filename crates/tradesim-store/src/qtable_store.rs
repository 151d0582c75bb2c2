//! Load and save of the Q-table JSON file.
//!
//! Loading is forgiving: a missing file is an empty table, an unreadable or
//! unparsable file is an empty table with a warning, and individual entries
//! with a malformed key or the wrong number of values are skipped with a
//! warning. Saving writes a sibling temporary file and renames it over the
//! target so a crash never leaves a half-written table.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};
use tradesim_core::{ActionValues, QTable, StateKey};

use crate::error::StoreError;

/// A Q-table file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QTableStore {
    path: PathBuf,
}

impl QTableStore {
    /// A store backed by `path`. Nothing is touched until load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the table, surfacing I/O and parse failures.
    ///
    /// A missing file yields an empty table. Malformed entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Serialization`] if it is not a JSON object.
    pub fn read(&self) -> Result<QTable, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No Q-table file, starting empty");
                return Ok(QTable::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let raw: BTreeMap<String, Value> = serde_json::from_str(&contents)?;
        let mut table = QTable::new();
        for (key, value) in raw {
            match decode_entry(&key, value) {
                Some((state, values)) => table.insert(state, values),
                None => warn!(
                    path = %self.path.display(),
                    key = %key,
                    "Skipping malformed Q-table entry"
                ),
            }
        }
        Ok(table)
    }

    /// Read the table, falling back to an empty one on any failure.
    pub fn load(&self) -> QTable {
        match self.read() {
            Ok(table) => {
                info!(path = %self.path.display(), states = table.len(), "Q-table loaded");
                table
            }
            Err(error) => {
                warn!(path = %self.path.display(), %error, "Q-table unreadable, starting empty");
                QTable::new()
            }
        }
    }

    /// Write `table` with keys in sorted order, replacing the file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory, temporary file, or rename
    /// fails, or [`StoreError::Serialization`] if encoding fails.
    pub fn save(&self, table: &QTable) -> Result<(), StoreError> {
        let encoded: BTreeMap<String, ActionValues> = table
            .iter()
            .map(|(state, values)| (state.to_string(), *values))
            .collect();
        let json = serde_json::to_string_pretty(&encoded)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }
        let staging = self.staging_path();
        fs::write(&staging, json).map_err(|source| io_error(&staging, source))?;
        fs::rename(&staging, &self.path).map_err(|source| io_error(&self.path, source))?;

        info!(path = %self.path.display(), states = encoded.len(), "Q-table saved");
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Parse one `"p,m,c,t": [..]` entry. `None` when either side is malformed.
fn decode_entry(key: &str, value: Value) -> Option<(StateKey, ActionValues)> {
    let state: StateKey = key.parse().ok()?;
    let values: Vec<f64> = serde_json::from_value(value).ok()?;
    let values: ActionValues = values.try_into().ok()?;
    Some((state, values))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn state(power_level: u8, money_level: u8) -> StateKey {
        StateKey {
            power_level,
            money_level,
            connections: 0,
            turn_bucket: 0,
        }
    }

    #[test]
    fn decode_accepts_well_formed_entry() {
        let value = serde_json::json!([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let decoded = decode_entry("2,3,0,0", value);
        assert_eq!(
            decoded,
            Some((state(2, 3), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]))
        );
    }

    #[test]
    fn decode_rejects_bad_key_or_length() {
        let seven = serde_json::json!([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(decode_entry("2,3,0", seven.clone()).is_none());
        assert!(decode_entry("x,3,0,0", seven).is_none());
        assert!(decode_entry("2,3,0,0", serde_json::json!([1.0, 2.0])).is_none());
        assert!(decode_entry("2,3,0,0", serde_json::json!("nope")).is_none());
    }

    #[test]
    fn staging_path_is_sibling() {
        let store = QTableStore::new("data/q_table.json");
        assert_eq!(store.staging_path(), PathBuf::from("data/q_table.json.tmp"));
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = QTableStore::new(dir.path().join("absent.json"));
        assert!(store.read().unwrap().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn unparsable_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let store = QTableStore::new(&path);
        assert!(matches!(store.read(), Err(StoreError::Serialization(_))));
        assert!(store.load().is_empty());
    }
}
