//! SDK Request/Response Types
//!
//! Mirrors the JSON-RPC types from the api-rpc crate.

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Starting,
    Downloading,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One tracked download
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub id: String,
    pub url: String,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: i64,
    #[serde(default)]
    pub finished_at: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from submit operation
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub job_ids: Vec<String>,
}

/// Response from list operation
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadsSnapshot {
    pub active: Vec<Job>,
    pub history: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OutputDirResponse {
    pub path: String,
}
