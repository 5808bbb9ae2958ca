// Application Layer - Job tracking services

pub mod batch;
mod destination;
pub mod dispatcher;
mod fault;
pub mod history;
pub mod query;
pub mod registry;
pub mod shutdown;

// Re-exports
pub use batch::{BatchEvent, BatchRunner, BatchSummary, FailedDownload};
pub use dispatcher::{DispatcherConfig, JobDispatcher, DEFAULT_GRACE_PERIOD};
pub use history::{HistoryRetention, DEFAULT_HISTORY_CAPACITY};
pub use query::{DownloadsSnapshot, StatusQueryService};
pub use registry::JobRegistry;
pub use shutdown::{stop_channel, StopSender, StopToken};
