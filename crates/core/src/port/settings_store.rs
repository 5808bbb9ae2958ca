// Settings Store Port
// Output-directory preference, persisted by an adapter

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Output directory used when no preference is stored
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Settings store interface
pub trait SettingsStore: Send + Sync {
    /// Current output directory
    ///
    /// Fails soft: any read or parse fault yields the default directory.
    /// Synchronous and must stay cheap (one small local read at most): async
    /// callers invoke it inline on the runtime.
    fn output_directory(&self) -> PathBuf;

    /// Persist a new output directory preference
    fn set_output_directory(&self, path: &Path) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// In-memory settings (nothing touches disk)
    pub struct InMemorySettingsStore {
        output_dir: Mutex<PathBuf>,
    }

    impl InMemorySettingsStore {
        pub fn new(output_dir: impl Into<PathBuf>) -> Self {
            Self {
                output_dir: Mutex::new(output_dir.into()),
            }
        }
    }

    impl SettingsStore for InMemorySettingsStore {
        fn output_directory(&self) -> PathBuf {
            self.output_dir.lock().unwrap().clone()
        }

        fn set_output_directory(&self, path: &Path) -> Result<()> {
            *self.output_dir.lock().unwrap() = path.to_path_buf();
            Ok(())
        }
    }
}
