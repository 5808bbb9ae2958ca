//! RPC Method Handlers
//!
//! Implements the logic behind each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    DownloadsSnapshot, Job, OutputDirResponse, SetOutputDirRequest, StatusRequest,
    SubmitRequest, SubmitResponse, SUBMIT_MESSAGE,
};
use jsonrpsee::types::ErrorObjectOwned;
use mediafetch_core::application::{JobDispatcher, StatusQueryService};
use mediafetch_core::error::AppError;
use mediafetch_core::port::SettingsStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    dispatcher: Arc<JobDispatcher>,
    query: Arc<StatusQueryService>,
    settings: Arc<dyn SettingsStore>,
}

impl RpcHandler {
    pub fn new(
        dispatcher: Arc<JobDispatcher>,
        query: Arc<StatusQueryService>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            dispatcher,
            query,
            settings,
        }
    }

    /// downloads.submit.v1
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        let job_ids = self
            .dispatcher
            .submit(params.urls)
            .await
            .map_err(to_rpc_error)?;

        Ok(SubmitResponse {
            message: SUBMIT_MESSAGE.to_string(),
            job_ids,
        })
    }

    /// downloads.status.v1
    pub async fn status(&self, params: StatusRequest) -> Result<Job, ErrorObjectOwned> {
        self.query.status_of(&params.job_id).map_err(to_rpc_error)
    }

    /// downloads.list.v1
    pub async fn list(&self) -> Result<DownloadsSnapshot, ErrorObjectOwned> {
        Ok(self.query.snapshot())
    }

    /// settings.output_dir.v1
    pub async fn output_dir(&self) -> Result<OutputDirResponse, ErrorObjectOwned> {
        Ok(OutputDirResponse {
            path: self.settings.output_directory().display().to_string(),
        })
    }

    /// settings.set_output_dir.v1
    pub async fn set_output_dir(
        &self,
        params: SetOutputDirRequest,
    ) -> Result<OutputDirResponse, ErrorObjectOwned> {
        let path = params.path.trim();
        if path.is_empty() {
            return Err(to_rpc_error(AppError::InvalidRequest(
                "Output directory path is empty".to_string(),
            )));
        }

        self.settings
            .set_output_directory(Path::new(path))
            .map_err(to_rpc_error)?;
        info!(path = %path, "Output directory changed");

        Ok(OutputDirResponse {
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use mediafetch_core::application::{
        DispatcherConfig, HistoryRetention, JobRegistry, DEFAULT_HISTORY_CAPACITY,
    };
    use mediafetch_core::domain::JobStatus;
    use mediafetch_core::port::download_executor::mocks::MockDownloadExecutor;
    use mediafetch_core::port::id_provider::SequentialIdProvider;
    use mediafetch_core::port::settings_store::mocks::InMemorySettingsStore;
    use mediafetch_core::port::time_provider::SystemTimeProvider;
    use std::time::Duration;

    fn handler(dir: &Path) -> RpcHandler {
        let time = Arc::new(SystemTimeProvider);
        let registry = Arc::new(JobRegistry::new(
            Arc::new(SequentialIdProvider::new()),
            time.clone(),
        ));
        let history = Arc::new(HistoryRetention::new(DEFAULT_HISTORY_CAPACITY));
        let settings: Arc<dyn SettingsStore> = Arc::new(InMemorySettingsStore::new(dir));
        let dispatcher = Arc::new(JobDispatcher::new(
            registry.clone(),
            history.clone(),
            Arc::new(MockDownloadExecutor::failing_when_contains("/1")),
            settings.clone(),
            time,
            DispatcherConfig::default(),
        ));
        let query = Arc::new(StatusQueryService::new(registry, history));

        RpcHandler::new(dispatcher, query, settings)
    }

    async fn wait_terminal(handler: &RpcHandler, job_id: &str) -> Job {
        for _ in 0..500 {
            let job = handler
                .status(StatusRequest {
                    job_id: job_id.to_string(),
                })
                .await
                .unwrap();
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} never finished", job_id);
    }

    #[tokio::test]
    async fn test_submit_then_poll_status() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let response = handler
            .submit(SubmitRequest {
                urls: vec!["https://x/1".into(), "https://x/2".into()],
            })
            .await
            .unwrap();

        assert_eq!(response.message, "Downloads started");
        assert_eq!(response.job_ids.len(), 2);

        let first = wait_terminal(&handler, &response.job_ids[0]).await;
        let second = wait_terminal(&handler, &response.job_ids[1]).await;
        assert_eq!(first.status, JobStatus::Failed);
        assert!(first.error.is_some());
        assert_eq!(second.status, JobStatus::Completed);
        assert_eq!(second.progress, 100);
    }

    #[tokio::test]
    async fn test_empty_submit_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let err = handler.submit(SubmitRequest { urls: vec![] }).await.unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert!(handler.list().await.unwrap().active.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let err = handler
            .status(StatusRequest {
                job_id: "missing".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_output_dir_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());
        let target = dir.path().join("videos");

        let set = handler
            .set_output_dir(SetOutputDirRequest {
                path: format!("  {}  ", target.display()),
            })
            .await
            .unwrap();
        let current = handler.output_dir().await.unwrap();

        assert_eq!(set.path, target.display().to_string());
        assert_eq!(current, set);
    }

    #[tokio::test]
    async fn test_blank_output_dir_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let handler = handler(dir.path());

        let err = handler
            .set_output_dir(SetOutputDirRequest { path: "  ".into() })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
    }
}
