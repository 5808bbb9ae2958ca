// MediaFetch Infrastructure - Filesystem Adapters
// Implements: SettingsStore

mod settings_store;

pub use settings_store::JsonSettingsStore;
