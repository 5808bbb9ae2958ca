// Port Layer - Interfaces for external dependencies

pub mod download_executor;
pub mod id_provider; // For deterministic testing
pub mod settings_store;
pub mod time_provider;

// Re-exports
pub use download_executor::{DownloadExecutor, ExecutionError};
pub use id_provider::IdProvider;
pub use settings_store::{SettingsStore, DEFAULT_OUTPUT_DIR};
pub use time_provider::TimeProvider;
