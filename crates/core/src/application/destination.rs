// Output directory preparation shared by the dispatcher and batch runner

use crate::error::Result;
use crate::port::SettingsStore;
use std::path::PathBuf;
use tracing::info;

/// Resolve the configured output directory and create it if missing
pub(crate) async fn ensure_output_directory(settings: &dyn SettingsStore) -> Result<PathBuf> {
    let destination = settings.output_directory();
    let exists = tokio::fs::metadata(&destination)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !exists {
        tokio::fs::create_dir_all(&destination).await?;
        info!(path = %destination.display(), "Created output directory");
    }
    Ok(destination)
}
