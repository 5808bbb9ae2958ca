// MediaFetch Core - Domain Logic, Ports & Job Tracking
// NO infrastructure dependencies: subprocesses, files and RPC live in adapter crates

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};
