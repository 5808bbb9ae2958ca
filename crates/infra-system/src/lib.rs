// MediaFetch Infrastructure - System Adapters
// Implements: DownloadExecutor

pub mod ytdlp_executor;

pub use ytdlp_executor::{YtDlpExecutor, DEFAULT_YTDLP_PROGRAM, FORMAT_SELECTOR};
