// Per-job task: drives one job from Starting to a terminal state, then evicts it

use super::JobContext;
use crate::application::fault::describe_join_error;
use crate::domain::{Job, JobId};
use crate::port::time_provider::SystemTimeProvider;
use crate::port::TimeProvider;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn, Instrument};

/// Error text for jobs still queued on the limiter when the dispatcher shuts down
pub(super) const SHUTDOWN_MESSAGE: &str = "Dispatcher shut down before the download started";

/// Outcome of one download attempt: `Err` carries the job's error text
type Outcome = std::result::Result<(), String>;

/// Full lifecycle of one job
///
/// Never panics outward and never returns an error: the lifecycle runs in its
/// own task, and a fault anywhere in it (executor, clock, registry) still
/// leaves a `Failed` job in history and gets it evicted.
pub(super) async fn run_job(ctx: JobContext, job_id: JobId, url: String, destination: PathBuf) {
    let lifecycle = tokio::spawn(
        drive(ctx.clone(), job_id.clone(), url, destination).in_current_span(),
    );

    if let Err(join_err) = lifecycle.await {
        let message = describe_join_error(join_err);
        error!(error = %message, "Job task faulted");
        fail_after_fault(&ctx, &job_id, message);
    }

    schedule_eviction(&ctx, &job_id).await;
}

/// Starting -> Downloading -> terminal
async fn drive(ctx: JobContext, job_id: JobId, url: String, destination: PathBuf) {
    // Held only while the download runs, released before the grace delay
    let _permit = match &ctx.limiter {
        Some(limiter) => match Arc::clone(limiter).acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                finish(&ctx, &job_id, Err(SHUTDOWN_MESSAGE.to_string()));
                return;
            }
        },
        None => None,
    };

    match ctx.registry.update(&job_id, |job| job.start_download()) {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Job vanished before download started");
            return;
        }
        Err(e) => {
            error!(error = %e, "Job could not enter downloading state");
            return;
        }
    }

    info!(url = %url, "Download started");
    let outcome = execute_isolated(&ctx, &url, destination).await;
    finish(&ctx, &job_id, outcome);
}

/// Run the executor in its own task so a panic surfaces as a `JoinError`
async fn execute_isolated(ctx: &JobContext, url: &str, destination: PathBuf) -> Outcome {
    let executor = Arc::clone(&ctx.executor);
    let url = url.to_string();

    let handle = tokio::spawn(async move { executor.execute(&url, &destination).await });

    match handle.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(join_err) => Err(describe_join_error(join_err)),
    }
}

/// Record the terminal state and append the snapshot to history exactly once
fn finish(ctx: &JobContext, job_id: &str, outcome: Outcome) {
    let now = ctx.time_provider.now_millis();
    let result = ctx.registry.update(job_id, |job| match &outcome {
        Ok(()) => job.complete(now),
        Err(message) => job.fail(message.as_str(), now),
    });

    match result {
        Ok(Some(snapshot)) => {
            log_terminal(&snapshot);
            ctx.history.append(snapshot);
        }
        Ok(None) => warn!("Job vanished before reaching a terminal state"),
        Err(e) => error!(error = %e, "Job could not reach a terminal state"),
    }
}

/// Terminal bookkeeping after the lifecycle task itself faulted
///
/// The injected clock may be what faulted, so it is read under a guard with
/// the system clock as fallback.
fn fail_after_fault(ctx: &JobContext, job_id: &str, message: String) {
    let now = catch_unwind(AssertUnwindSafe(|| ctx.time_provider.now_millis()))
        .unwrap_or_else(|_| SystemTimeProvider.now_millis());

    match ctx.registry.update(job_id, |job| job.fail(message.as_str(), now)) {
        Ok(Some(snapshot)) => {
            log_terminal(&snapshot);
            ctx.history.append(snapshot);
        }
        Ok(None) => warn!("Job vanished before reaching a terminal state"),
        // Fault came after the terminal transition; make sure history has it
        Err(_) => {
            let terminal = ctx.registry.get(job_id).filter(Job::is_terminal);
            if let Some(job) = terminal {
                if ctx.history.find(job_id).is_none() {
                    ctx.history.append(job);
                }
            }
        }
    }
}

fn log_terminal(job: &Job) {
    match &job.error {
        None => info!(url = %job.url, status = %job.status, "Download finished"),
        Some(message) => warn!(url = %job.url, error = %message, "Download failed"),
    }
}

/// Keep the finished job visible for the grace period, then drop it
async fn schedule_eviction(ctx: &JobContext, job_id: &str) {
    sleep(ctx.grace_period).await;
    if ctx.registry.remove(job_id).is_some() {
        debug!("Evicted finished job from live registry");
    }
}
