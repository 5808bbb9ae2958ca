// JSON settings file
//
// Format: { "output_directory": "<path>" }. Reads never fail: a missing,
// unreadable or malformed file yields the default directory.

use mediafetch_core::error::Result;
use mediafetch_core::port::SettingsStore;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    output_directory: Option<String>,
}

/// Settings persisted as a small JSON document
pub struct JsonSettingsStore {
    path: PathBuf,
    default_output: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>, default_output: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_output: default_output.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Blocking read of a document of a few bytes
    fn load(&self) -> Option<SettingsFile> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return None;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read settings, using defaults");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Malformed settings file, using defaults");
                None
            }
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn output_directory(&self) -> PathBuf {
        self.load()
            .and_then(|settings| settings.output_directory)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| self.default_output.clone())
    }

    fn set_output_directory(&self, path: &Path) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut settings = self.load().unwrap_or_default();
        settings.output_directory = Some(path.display().to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&self.path, json)?;

        info!(
            settings = %self.path.display(),
            output_directory = %path.display(),
            "Saved output directory"
        );
        Ok(())
    }
}
