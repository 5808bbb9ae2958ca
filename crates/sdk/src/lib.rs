//! MediaFetch SDK - Rust Client Library
//!
//! Provides a convenient client for the MediaFetch daemon.
//!
//! # Example
//!
//! ```no_run
//! use mediafetch_sdk::MediaFetchClient;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MediaFetchClient::connect("http://127.0.0.1:9535").await?;
//!
//!     let response = client
//!         .submit(vec!["https://example.com/watch?v=1".to_string()])
//!         .await?;
//!
//!     for job_id in &response.job_ids {
//!         let job = client
//!             .wait_for(job_id, Duration::from_secs(1), Duration::from_secs(600))
//!             .await?;
//!         println!("{} -> {:?}", job.url, job.status);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::MediaFetchClient;
pub use error::{Result, SdkError};
pub use types::{DownloadsSnapshot, Job, JobStatus, SubmitResponse};
