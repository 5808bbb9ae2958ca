// Batch Runner - sequential downloads with a stop signal
//
// Used when no daemon is running. A stop request prevents further URLs from
// being launched but never interrupts the download already in progress.

use crate::application::destination::ensure_output_directory;
use crate::application::fault::describe_join_error;
use crate::application::shutdown::StopToken;
use crate::error::{AppError, Result};
use crate::port::{DownloadExecutor, SettingsStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Progress notification for the caller's UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        index: usize, // 1-based
        total: usize,
        url: String,
    },
    Finished {
        index: usize,
        url: String,
        error: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedDownload {
    pub url: String,
    pub error: String,
}

/// What happened to a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<FailedDownload>,
    /// True if the stop signal cut the batch short
    pub stopped: bool,
}

impl BatchSummary {
    /// URLs never attempted because of a stop
    pub fn skipped(&self) -> usize {
        self.total - self.succeeded - self.failed.len()
    }
}

pub struct BatchRunner {
    executor: Arc<dyn DownloadExecutor>,
    settings: Arc<dyn SettingsStore>,
}

impl BatchRunner {
    pub fn new(executor: Arc<dyn DownloadExecutor>, settings: Arc<dyn SettingsStore>) -> Self {
        Self { executor, settings }
    }

    /// Download `urls` one after another into the configured directory
    ///
    /// # Errors
    /// - AppError::InvalidRequest if `urls` is empty
    /// - AppError::Io if the output directory cannot be created
    pub async fn run<F>(
        &self,
        urls: Vec<String>,
        stop: &StopToken,
        mut on_event: F,
    ) -> Result<BatchSummary>
    where
        F: FnMut(&BatchEvent),
    {
        if urls.is_empty() {
            return Err(AppError::InvalidRequest("No URLs provided".to_string()));
        }
        let destination = ensure_output_directory(self.settings.as_ref()).await?;

        let total = urls.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        for (position, url) in urls.into_iter().enumerate() {
            if stop.is_stopped() {
                info!(remaining = total - position, "Batch stopped before next download");
                summary.stopped = true;
                break;
            }

            let index = position + 1;
            on_event(&BatchEvent::Started {
                index,
                total,
                url: url.clone(),
            });

            let error = self.download_one(&url, &destination).await.err();
            match &error {
                None => summary.succeeded += 1,
                Some(message) => {
                    warn!(url = %url, error = %message, "Batch download failed");
                    summary.failed.push(FailedDownload {
                        url: url.clone(),
                        error: message.clone(),
                    });
                }
            }
            on_event(&BatchEvent::Finished { index, url, error });
        }

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed.len(),
            stopped = summary.stopped,
            "Batch finished"
        );
        Ok(summary)
    }

    async fn download_one(&self, url: &str, destination: &Path) -> std::result::Result<(), String> {
        let executor = Arc::clone(&self.executor);
        let url = url.to_string();
        let destination = destination.to_path_buf();

        match tokio::spawn(async move { executor.execute(&url, &destination).await }).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(join_err) => Err(describe_join_error(join_err)),
        }
    }
}
