// Fault isolation for per-job tasks

use std::any::Any;
use tokio::task::JoinError;

/// Prefix for failures that did not come from the executor's own report
pub const UNEXPECTED_FAULT_PREFIX: &str = "Unexpected fault";

/// Turn a failed join into job error text
///
/// Panics are unwrapped to their message; cancellation is reported as-is.
pub fn describe_join_error(join_err: JoinError) -> String {
    let detail = if join_err.is_panic() {
        panic_message(join_err.into_panic())
    } else {
        join_err.to_string()
    };
    format!("{}: {}", UNEXPECTED_FAULT_PREFIX, detail)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
