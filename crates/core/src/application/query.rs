// Status Query Service - read-only view over live jobs and history

use crate::application::history::HistoryRetention;
use crate::application::registry::JobRegistry;
use crate::domain::Job;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Combined dashboard view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadsSnapshot {
    pub active: Vec<Job>,
    pub history: Vec<Job>,
}

/// Answers "what is the state of job X / all jobs"
pub struct StatusQueryService {
    registry: Arc<JobRegistry>,
    history: Arc<HistoryRetention>,
}

impl StatusQueryService {
    pub fn new(registry: Arc<JobRegistry>, history: Arc<HistoryRetention>) -> Self {
        Self { registry, history }
    }

    /// Live registry first, then history
    ///
    /// # Errors
    /// - AppError::NotFound if the id is in neither
    pub fn status_of(&self, job_id: &str) -> Result<Job> {
        self.registry
            .get(job_id)
            .or_else(|| self.history.find(job_id))
            .ok_or_else(|| AppError::NotFound(format!("Download {} not found", job_id)))
    }

    pub fn snapshot(&self) -> DownloadsSnapshot {
        DownloadsSnapshot {
            active: self.registry.list_active(),
            history: self.history.all(),
        }
    }
}
