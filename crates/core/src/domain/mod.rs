// Domain Layer - Pure business logic and entities

pub mod error;
pub mod job;
pub mod url_list;

// Re-exports
pub use error::DomainError;
pub use job::{Job, JobId, JobStatus, DEFAULT_FAILURE_MESSAGE};
pub use url_list::split_url_list;
