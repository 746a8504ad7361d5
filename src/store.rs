//! JSON file storage
//!
//! The whole [`AppData`] snapshot is written as one pretty-printed JSON
//! document on every save. Loading is forgiving: a missing or unreadable file
//! yields empty defaults instead of an error, so the app always starts.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{AppData, DEFAULT_DAYS_TO_SHOW};

/// Env var that overrides the data file location
pub const DATA_PATH_ENV: &str = "HABITREE_DATA_PATH";

/// Directory under the home directory holding data and config
pub const DATA_DIR_NAME: &str = ".microhabittree";

const DATA_FILE_NAME: &str = "habits.json";

/// Where snapshots are loaded from and saved to
pub trait Storage {
    /// Load the stored snapshot, falling back to defaults on any failure
    fn load(&self) -> AppData;

    /// Replace the stored snapshot
    fn save(&self, data: &AppData) -> Result<()>;
}

/// Serialize a snapshot for export
pub fn export_json(data: &AppData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Parse exported JSON. Any malformed field rejects the whole document, and
/// so does a display window other than 7, 14 or 30 days.
pub fn parse_import(text: &str) -> Result<AppData> {
    let data: AppData = serde_json::from_str(text)?;
    if !data.settings.has_supported_window() {
        return Err(Error::InvalidDaysToShow(data.settings.days_to_show));
    }
    Ok(data)
}

/// Resolve the data file location.
///
/// Priority: `HABITREE_DATA_PATH`, then `storage.data_path` from the config,
/// then `~/.microhabittree/habits.json`.
pub fn data_path(config: &Config) -> PathBuf {
    if let Ok(path) = std::env::var(DATA_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.storage.data_path {
        return path.clone();
    }

    dirs::home_dir()
        .unwrap_or_default()
        .join(DATA_DIR_NAME)
        .join(DATA_FILE_NAME)
}

/// Snapshot storage backed by a single JSON file
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    /// Open the store at `path`, creating the parent directory if needed
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("could not create data directory {}: {}", parent.display(), e);
            }
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<AppData> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let mut data: AppData = serde_json::from_str(&text)?;
        if !data.settings.has_supported_window() {
            log::warn!(
                "unsupported daysToShow {} in {}, using {}",
                data.settings.days_to_show,
                self.path.display(),
                DEFAULT_DAYS_TO_SHOW
            );
            data.settings.days_to_show = DEFAULT_DAYS_TO_SHOW;
        }
        Ok(data)
    }
}

impl Storage for JsonStore {
    fn load(&self) -> AppData {
        if !self.path.exists() {
            log::info!("no data file at {}, starting fresh", self.path.display());
            return AppData::default();
        }

        match self.read() {
            Ok(data) => {
                log::debug!(
                    "loaded {} habit(s) from {}",
                    data.habits.len(),
                    self.path.display()
                );
                data
            }
            Err(e) => {
                log::warn!("error loading data, using defaults: {}", e);
                AppData::default()
            }
        }
    }

    fn save(&self, data: &AppData) -> Result<()> {
        let text = export_json(data)?;
        std::fs::write(&self.path, text).map_err(|e| Error::io(&self.path, e))?;
        log::debug!("saved {} habit(s) to {}", data.habits.len(), self.path.display());
        Ok(())
    }
}

/// Storage that keeps the snapshot in memory and counts writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RefCell<AppData>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new(data: AppData) -> Self {
        Self {
            data: RefCell::new(data),
            ..Self::default()
        }
    }

    /// Number of successful and failed save calls
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Make subsequent saves fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn stored(&self) -> AppData {
        self.data.borrow().clone()
    }

    /// Replace the stored snapshot behind the tracker's back
    pub fn overwrite(&self, data: AppData) {
        *self.data.borrow_mut() = data;
    }
}

impl Storage for MemoryStore {
    fn load(&self) -> AppData {
        self.stored()
    }

    fn save(&self, data: &AppData) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        if self.fail_writes.get() {
            return Err(Error::io("<memory>", std::io::Error::other("write refused")));
        }
        *self.data.borrow_mut() = data.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Habit;
    use tempfile::TempDir;

    fn sample() -> AppData {
        let mut data = AppData::default();
        data.habits.push(Habit::new("Stretch", "🧘", crate::model::today()));
        data.settings.total_check_ins = 3;
        data
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("nested").join("habits.json"));
        assert_eq!(store.load(), AppData::default());
        // Parent directory is created on open
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("habits.json"));
        let data = sample();
        store.save(&data).unwrap();
        assert_eq!(store.load(), data);
    }

    #[test]
    fn test_corrupt_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonStore::open(&path);
        assert_eq!(store.load(), AppData::default());
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore {
            path: dir.path().join("gone").join("habits.json"),
        };
        assert!(matches!(store.save(&sample()), Err(Error::Io { .. })));
    }

    #[test]
    fn test_parse_import_rejects_garbage() {
        assert!(parse_import("definitely not json").is_err());
        assert!(parse_import(r#"{"habits": [{"name": "no id"}]}"#).is_err());
        assert!(parse_import("{}").unwrap().habits.is_empty());
    }

    #[test]
    fn test_parse_import_rejects_unsupported_window() {
        let text = r#"{"habits": [], "settings": {"daysToShow": 4000000000}}"#;
        assert!(matches!(
            parse_import(text),
            Err(Error::InvalidDaysToShow(4_000_000_000))
        ));
        let text = r#"{"settings": {"daysToShow": 30}}"#;
        assert_eq!(parse_import(text).unwrap().settings.days_to_show, 30);
    }

    #[test]
    fn test_load_resets_unsupported_window() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("habits.json");
        std::fs::write(
            &path,
            r#"{"habits": [{"id": "a", "name": "Walk"}], "settings": {"daysToShow": 4000000000}}"#,
        )
        .unwrap();
        let data = JsonStore::open(&path).load();
        assert_eq!(data.habits.len(), 1, "habits survive the bad setting");
        assert_eq!(data.settings.days_to_show, DEFAULT_DAYS_TO_SHOW);
    }

    #[test]
    fn test_export_is_reimportable() {
        let data = sample();
        let text = export_json(&data).unwrap();
        assert!(text.contains("\"totalCheckIns\": 3"));
        assert_eq!(parse_import(&text).unwrap(), data);
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let store = MemoryStore::default();
        store.save(&sample()).unwrap();
        store.fail_writes(true);
        assert!(store.save(&AppData::default()).is_err());
        assert_eq!(store.writes(), 2);
        assert_eq!(store.load().habits.len(), 1);
    }
}
