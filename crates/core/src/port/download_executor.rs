// Download Executor Port
// Abstraction over the external tool that fetches one URL to disk

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Execution errors
///
/// The `Display` text of each variant becomes the job's error message.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("{message}")]
    Failed {
        exit_code: Option<i32>,
        message: String,
    },

    #[error("Download timed out after {0}s")]
    Timeout(u64),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Download Executor trait
///
/// Implementations:
/// - YtDlpExecutor: spawns the external downloader
/// - MockDownloadExecutor: scripted outcomes for tests
#[async_trait]
pub trait DownloadExecutor: Send + Sync {
    /// Run one download to completion
    ///
    /// Blocks the calling task until the download finishes. `destination`
    /// exists before this is called.
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the tool cannot be started
    /// - ExecutionError::Failed if the tool reports failure
    /// - ExecutionError::Timeout if a configured deadline elapses
    async fn execute(&self, url: &str, destination: &Path) -> Result<(), ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Panic with message (for fault isolation testing)
        Panic(String),
        /// Fail when the URL contains the given marker, succeed otherwise
        FailWhenContains(String),
    }

    /// Mock Download Executor for testing
    pub struct MockDownloadExecutor {
        behavior: MockBehavior,
        delay: Option<Duration>,
        calls: Mutex<Vec<(String, PathBuf)>>,
    }

    impl MockDownloadExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_panic_inducing(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Panic(message.into()))
        }

        pub fn failing_when_contains(marker: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailWhenContains(marker.into()))
        }

        /// Sleep before returning, to keep jobs in `Downloading` for a while
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// URLs and destinations seen, in call order
        pub fn calls(&self) -> Vec<(String, PathBuf)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DownloadExecutor for MockDownloadExecutor {
        async fn execute(&self, url: &str, destination: &Path) -> Result<(), ExecutionError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), destination.to_path_buf()));

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            match &self.behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(ExecutionError::Failed {
                    exit_code: Some(1),
                    message: msg.clone(),
                }),
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for fault isolation testing
                }
                MockBehavior::FailWhenContains(marker) if url.contains(marker.as_str()) => {
                    Err(ExecutionError::Failed {
                        exit_code: Some(1),
                        message: format!("ERROR: unable to download {}", url),
                    })
                }
                MockBehavior::FailWhenContains(_) => Ok(()),
            }
        }
    }
}
