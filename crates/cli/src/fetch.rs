//! Daemon-less sequential downloads

use anyhow::Result;
use colored::Colorize;
use mediafetch_core::application::{stop_channel, BatchEvent, BatchRunner, BatchSummary};
use mediafetch_core::port::SettingsStore;
use mediafetch_infra_fs::JsonSettingsStore;
use mediafetch_infra_system::YtDlpExecutor;
use std::path::PathBuf;
use std::sync::Arc;

pub struct FetchOptions {
    pub settings_path: PathBuf,
    pub default_output_dir: PathBuf,
    pub ytdlp_path: PathBuf,
}

/// Download `urls` one by one; Ctrl+C stops after the current download
pub async fn run(urls: Vec<String>, options: FetchOptions) -> Result<BatchSummary> {
    let settings: Arc<dyn SettingsStore> = Arc::new(JsonSettingsStore::new(
        options.settings_path,
        options.default_output_dir,
    ));
    let destination = settings.output_directory();
    let runner = BatchRunner::new(Arc::new(YtDlpExecutor::new(options.ytdlp_path)), settings);

    let (stop_tx, stop) = stop_channel();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "{}",
                "Stopping after the current download...".yellow().bold()
            );
            stop_tx.stop();
        }
    });

    println!(
        "{} {}",
        "Saving to".cyan().bold(),
        destination.display()
    );
    let summary = runner.run(urls, &stop, print_event).await;
    interrupt.abort();

    let summary = summary?;
    print_summary(&summary);
    Ok(summary)
}

fn print_event(event: &BatchEvent) {
    match event {
        BatchEvent::Started { index, total, url } => {
            println!("[{}/{}] {} {}", index, total, "Downloading".cyan(), url);
        }
        BatchEvent::Finished { url, error: None, .. } => {
            println!("      {} {}", "✓".green(), url);
        }
        BatchEvent::Finished {
            url,
            error: Some(message),
            ..
        } => {
            println!("      {} {}: {}", "✗".red(), url, message.red());
        }
    }
}

fn print_summary(summary: &BatchSummary) {
    println!();
    println!(
        "{} {} succeeded, {} failed, {} skipped",
        "Done:".bold(),
        summary.succeeded.to_string().green(),
        summary.failed.len().to_string().red(),
        summary.skipped()
    );
    if summary.stopped {
        println!("{}", "Stopped before all downloads were attempted".yellow());
    }
}
