// Job Domain Model

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Job ID (UUID v4 in production)
pub type JobId = String;

/// Failure text used when the executor reports failure without a message
pub const DEFAULT_FAILURE_MESSAGE: &str = "Download failed";

/// Download status
///
/// Transitions only move forward:
/// `Starting -> Downloading -> {Completed | Failed}`, plus `Starting -> Failed`
/// for faults raised before the executor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Downloading,
    Completed,
    Failed,
}

impl JobStatus {
    /// `Completed` and `Failed` are terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Starting => write!(f, "starting"),
            JobStatus::Downloading => write!(f, "downloading"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One tracked download attempt for a single URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub url: String,
    pub status: JobStatus,
    /// 0-100, only set to 100 on completion
    pub progress: u8,
    pub created_at: i64, // epoch ms
    pub finished_at: Option<i64>,
    pub error: Option<String>,
}

impl Job {
    /// Create a new job in `Starting` state
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Submission timestamp in epoch ms (injected, not system time)
    /// * `url` - Source to fetch
    pub fn new(id: impl Into<String>, created_at: i64, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            status: JobStatus::Starting,
            progress: 0,
            created_at,
            finished_at: None,
            error: None,
        }
    }

    /// Transition `Starting -> Downloading`
    pub fn start_download(&mut self) -> Result<()> {
        self.ensure_status(&[JobStatus::Starting], JobStatus::Downloading)?;
        self.status = JobStatus::Downloading;
        Ok(())
    }

    /// Transition `Downloading -> Completed` with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.ensure_status(&[JobStatus::Downloading], JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Transition to `Failed` from any non-terminal state
    ///
    /// A blank message is replaced by [`DEFAULT_FAILURE_MESSAGE`] so a failed
    /// job always carries error text.
    pub fn fail(&mut self, message: impl Into<String>, now_millis: i64) -> Result<()> {
        self.ensure_status(
            &[JobStatus::Starting, JobStatus::Downloading],
            JobStatus::Failed,
        )?;

        let message = message.into();
        let message = if message.trim().is_empty() {
            DEFAULT_FAILURE_MESSAGE.to_string()
        } else {
            message
        };

        self.status = JobStatus::Failed;
        self.error = Some(message);
        self.finished_at = Some(now_millis);
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn ensure_status(&self, allowed: &[JobStatus], to: JobStatus) -> Result<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(DomainError::InvalidStateTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            })
        }
    }
}
