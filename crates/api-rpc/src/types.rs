//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use serde::{Deserialize, Serialize};

pub use mediafetch_core::application::DownloadsSnapshot;
pub use mediafetch_core::domain::Job;

/// Acknowledgement text returned by a successful submission
pub const SUBMIT_MESSAGE: &str = "Downloads started";

/// downloads.submit.v1 - Start one download per URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub job_ids: Vec<String>,
}

/// downloads.status.v1 - Status of one job (result is a Job)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    pub job_id: String,
}

/// settings.output_dir.v1 / settings.set_output_dir.v1 result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDirResponse {
    pub path: String,
}

/// settings.set_output_dir.v1 - Persist a new output directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetOutputDirRequest {
    pub path: String,
}
