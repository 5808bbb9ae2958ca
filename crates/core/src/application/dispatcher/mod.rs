// Job Dispatcher - turns a batch of URLs into concurrently running jobs

mod task;

use crate::application::destination::ensure_output_directory;
use crate::application::history::HistoryRetention;
use crate::application::registry::JobRegistry;
use crate::domain::JobId;
use crate::error::{AppError, Result};
use crate::port::{DownloadExecutor, SettingsStore, TimeProvider};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, info_span, Instrument};

/// How long a finished job stays in the live registry (5 minutes)
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(300);

/// Dispatcher tuning
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Delay between reaching a terminal state and leaving the live registry
    pub grace_period: Duration,
    /// Maximum downloads running at once (`None` = one task per URL, no cap)
    pub max_concurrent: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            grace_period: DEFAULT_GRACE_PERIOD,
            max_concurrent: None,
        }
    }
}

/// Everything a per-job task needs, cloned once per spawn
#[derive(Clone)]
pub(crate) struct JobContext {
    registry: Arc<JobRegistry>,
    history: Arc<HistoryRetention>,
    executor: Arc<dyn DownloadExecutor>,
    time_provider: Arc<dyn TimeProvider>,
    limiter: Option<Arc<Semaphore>>,
    grace_period: Duration,
}

/// Accepts batches of URLs and launches one independent task per job
pub struct JobDispatcher {
    ctx: JobContext,
    settings: Arc<dyn SettingsStore>,
}

impl JobDispatcher {
    pub fn new(
        registry: Arc<JobRegistry>,
        history: Arc<HistoryRetention>,
        executor: Arc<dyn DownloadExecutor>,
        settings: Arc<dyn SettingsStore>,
        time_provider: Arc<dyn TimeProvider>,
        config: DispatcherConfig,
    ) -> Self {
        let limiter = config
            .max_concurrent
            .map(|permits| Arc::new(Semaphore::new(permits.max(1))));

        Self {
            ctx: JobContext {
                registry,
                history,
                executor,
                time_provider,
                limiter,
                grace_period: config.grace_period,
            },
            settings,
        }
    }

    /// Create one job per URL and start downloading in the background
    ///
    /// Returns the job ids in input order without waiting for any download.
    ///
    /// # Errors
    /// - AppError::InvalidRequest if the list is empty or holds a blank URL
    ///   (nothing is created in that case)
    /// - AppError::Io if the output directory cannot be created
    pub async fn submit(&self, urls: Vec<String>) -> Result<Vec<JobId>> {
        let urls = validate_urls(urls)?;
        let destination = ensure_output_directory(self.settings.as_ref()).await?;

        let mut job_ids = Vec::with_capacity(urls.len());
        for url in urls {
            let job_id = self.ctx.registry.create(url.clone());
            self.spawn_job(job_id.clone(), url, destination.clone());
            job_ids.push(job_id);
        }

        info!(
            count = job_ids.len(),
            destination = %destination.display(),
            "Downloads started"
        );
        Ok(job_ids)
    }

    /// Stop handing out download slots
    ///
    /// Jobs still waiting for a slot fail instead of starting; downloads
    /// already running are left alone. No effect without `max_concurrent`.
    pub fn shutdown(&self) {
        if let Some(limiter) = &self.ctx.limiter {
            limiter.close();
            info!("Dispatcher closed to new downloads");
        }
    }

    fn spawn_job(&self, job_id: JobId, url: String, destination: PathBuf) {
        let span = info_span!("download", job_id = %job_id);
        tokio::spawn(task::run_job(self.ctx.clone(), job_id, url, destination).instrument(span));
    }
}

fn validate_urls(urls: Vec<String>) -> Result<Vec<String>> {
    if urls.is_empty() {
        return Err(AppError::InvalidRequest("No URLs provided".to_string()));
    }

    let urls: Vec<String> = urls.into_iter().map(|u| u.trim().to_string()).collect();
    if let Some(position) = urls.iter().position(|u| u.is_empty()) {
        return Err(AppError::InvalidRequest(format!(
            "URL at position {} is empty",
            position
        )));
    }
    Ok(urls)
}
