//! Core services wired to the real filesystem and process adapters

use std::sync::Arc;
use std::time::Duration;

use mediafetch_core::application::{
    stop_channel, BatchRunner, DispatcherConfig, HistoryRetention, JobDispatcher, JobRegistry,
    StatusQueryService,
};
use mediafetch_core::domain::JobStatus;
use mediafetch_core::port::download_executor::mocks::MockDownloadExecutor;
use mediafetch_core::port::id_provider::SequentialIdProvider;
use mediafetch_core::port::time_provider::SystemTimeProvider;
use mediafetch_core::port::{DownloadExecutor, SettingsStore};
use mediafetch_infra_fs::JsonSettingsStore;
use mediafetch_infra_system::YtDlpExecutor;

fn dispatcher(
    executor: Arc<dyn DownloadExecutor>,
    settings: Arc<dyn SettingsStore>,
) -> (JobDispatcher, StatusQueryService, Arc<HistoryRetention>) {
    let time = Arc::new(SystemTimeProvider);
    let registry = Arc::new(JobRegistry::new(
        Arc::new(SequentialIdProvider::new()),
        time.clone(),
    ));
    let history = Arc::new(HistoryRetention::default());
    let dispatcher = JobDispatcher::new(
        registry.clone(),
        history.clone(),
        executor,
        settings,
        time,
        DispatcherConfig::default(),
    );
    let query = StatusQueryService::new(registry, history.clone());
    (dispatcher, query, history)
}

async fn wait_for_history(history: &HistoryRetention, count: usize) {
    for _ in 0..1_000 {
        if history.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("history never reached {} entries", count);
}

#[tokio::test]
async fn test_downloads_land_in_persisted_output_directory() {
    let root = tempfile::tempdir().unwrap();
    let settings = Arc::new(JsonSettingsStore::new(
        root.path().join("config").join("settings.json"),
        root.path().join("default"),
    ));
    let target = root.path().join("chosen").join("videos");
    settings.set_output_directory(&target).unwrap();

    let executor = Arc::new(MockDownloadExecutor::new_success());
    let (dispatcher, _, history) = dispatcher(executor.clone(), settings);

    dispatcher
        .submit(vec!["https://x/1".to_string()])
        .await
        .unwrap();
    wait_for_history(&history, 1).await;

    assert!(target.is_dir());
    assert_eq!(executor.calls()[0].1, target);
}

#[tokio::test]
async fn test_corrupt_settings_fall_back_to_default_directory() {
    let root = tempfile::tempdir().unwrap();
    let settings_path = root.path().join("settings.json");
    std::fs::write(&settings_path, "][").unwrap();
    let default_dir = root.path().join("default");
    let settings = Arc::new(JsonSettingsStore::new(&settings_path, &default_dir));

    let executor = Arc::new(MockDownloadExecutor::new_success());
    let (dispatcher, _, history) = dispatcher(executor.clone(), settings);

    dispatcher
        .submit(vec!["https://x/1".to_string()])
        .await
        .unwrap();
    wait_for_history(&history, 1).await;

    assert!(default_dir.is_dir());
    assert_eq!(executor.calls()[0].1, default_dir);
}

#[tokio::test]
async fn test_batch_runner_uses_settings_file() {
    let root = tempfile::tempdir().unwrap();
    let settings = Arc::new(JsonSettingsStore::new(
        root.path().join("settings.json"),
        root.path().join("out"),
    ));
    let executor = Arc::new(MockDownloadExecutor::failing_when_contains("broken"));
    let runner = BatchRunner::new(executor.clone(), settings);
    let (_stop_tx, stop) = stop_channel();

    let summary = runner
        .run(
            vec!["https://x/ok".to_string(), "https://x/broken".to_string()],
            &stop,
            |_| {},
        )
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed.len(), 1);
    assert!(root.path().join("out").is_dir());
}

#[tokio::test]
async fn test_missing_downloader_binary_fails_the_job() {
    let root = tempfile::tempdir().unwrap();
    let settings = Arc::new(JsonSettingsStore::new(
        root.path().join("settings.json"),
        root.path().join("out"),
    ));
    let executor = Arc::new(YtDlpExecutor::new(root.path().join("no-such-yt-dlp")));
    let (dispatcher, query, history) = dispatcher(executor, settings);

    let ids = dispatcher
        .submit(vec!["https://x/1".to_string()])
        .await
        .unwrap();
    wait_for_history(&history, 1).await;

    let job = query.status_of(&ids[0]).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().starts_with("Spawn failed"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_nonzero_exit_fails_the_job_with_exit_message() {
    let root = tempfile::tempdir().unwrap();
    let settings = Arc::new(JsonSettingsStore::new(
        root.path().join("settings.json"),
        root.path().join("out"),
    ));
    let (dispatcher, query, history) = dispatcher(Arc::new(YtDlpExecutor::new("false")), settings);

    let ids = dispatcher
        .submit(vec!["https://x/1".to_string()])
        .await
        .unwrap();
    wait_for_history(&history, 1).await;

    let job = query.status_of(&ids[0]).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error.as_deref(), Some("yt-dlp exited with code 1"));
}
