//! MediaFetch CLI - Command-line interface for the MediaFetch daemon

mod display;
mod fetch;
mod rpc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mediafetch_core::application::DownloadsSnapshot;
use mediafetch_core::domain::{split_url_list, Job};
use serde::Deserialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use rpc::RpcClient;

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9535";
const DEFAULT_SETTINGS_PATH: &str = "~/.mediafetch/settings.json";

#[derive(Parser)]
#[command(name = "mediafetch")]
#[command(about = "MediaFetch download tracker CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "MEDIAFETCH_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start downloads on the daemon
    Submit {
        /// URLs (each argument may hold several, separated by commas or newlines)
        urls: Vec<String>,

        /// Read more URLs from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Poll until every download has finished
        #[arg(short, long)]
        wait: bool,

        /// Polling interval in milliseconds
        #[arg(long, default_value = "1000")]
        poll_ms: u64,

        /// Give up waiting after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Show one download
    Status {
        /// Job ID
        job_id: String,
    },

    /// List active and recent downloads
    List,

    /// Show the output directory
    OutputDir,

    /// Change the output directory
    SetOutputDir {
        /// New directory
        path: String,
    },

    /// Download locally, one URL at a time, without the daemon
    Fetch {
        /// URLs (each argument may hold several, separated by commas or newlines)
        urls: Vec<String>,

        /// Read more URLs from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Settings file holding the output directory
        #[arg(long, env = "MEDIAFETCH_SETTINGS_PATH", default_value = DEFAULT_SETTINGS_PATH)]
        settings: String,

        /// Output directory when none is stored
        #[arg(long, env = "MEDIAFETCH_DEFAULT_OUTPUT_DIR", default_value = mediafetch_core::port::DEFAULT_OUTPUT_DIR)]
        default_output_dir: String,

        /// yt-dlp executable
        #[arg(long, env = "MEDIAFETCH_YTDLP_PATH", default_value = mediafetch_infra_system::DEFAULT_YTDLP_PROGRAM)]
        ytdlp: String,
    },
}

#[derive(Deserialize)]
struct SubmitResult {
    message: String,
    job_ids: Vec<String>,
}

#[derive(Deserialize)]
struct OutputDirResult {
    path: String,
}

/// Gather URLs from arguments and an optional file
fn collect_urls(args: &[String], file: Option<&Path>) -> Result<Vec<String>> {
    let mut urls: Vec<String> = args.iter().flat_map(|arg| split_url_list(arg)).collect();
    if let Some(path) = file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL file {}", path.display()))?;
        urls.extend(split_url_list(&content));
    }
    Ok(urls)
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Poll until every job is terminal, or the deadline passes
async fn wait_for_all(
    client: &RpcClient,
    job_ids: &[String],
    poll: Duration,
    timeout: Option<Duration>,
) -> Result<Vec<Job>> {
    let started = Instant::now();
    loop {
        let mut jobs = Vec::with_capacity(job_ids.len());
        for job_id in job_ids {
            let job: Job = client
                .call("downloads.status.v1", json!({ "job_id": job_id }))
                .await?;
            jobs.push(job);
        }
        if jobs.iter().all(Job::is_terminal) {
            return Ok(jobs);
        }
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                anyhow::bail!("Timed out after {}s waiting for downloads", limit.as_secs());
            }
        }
        tokio::time::sleep(poll).await;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = RpcClient::new(cli.rpc_url);

    match cli.command {
        Commands::Submit {
            urls,
            file,
            wait,
            poll_ms,
            timeout_secs,
        } => {
            let urls = collect_urls(&urls, file.as_deref())?;
            let result: SubmitResult = client
                .call("downloads.submit.v1", json!({ "urls": urls }))
                .await?;

            println!("{}", format!("✓ {}", result.message).green().bold());
            for job_id in &result.job_ids {
                println!("  {}", job_id);
            }

            if wait {
                println!();
                println!("{}", "Waiting for downloads to finish...".cyan());
                let jobs = wait_for_all(
                    &client,
                    &result.job_ids,
                    Duration::from_millis(poll_ms),
                    timeout_secs.map(Duration::from_secs),
                )
                .await?;
                println!("{}", display::jobs_table(&jobs));

                let failed = jobs.iter().filter(|j| j.error.is_some()).count();
                if failed > 0 {
                    anyhow::bail!("{} of {} downloads failed", failed, jobs.len());
                }
            }
        }

        Commands::Status { job_id } => {
            let job: Job = client
                .call("downloads.status.v1", json!({ "job_id": job_id }))
                .await?;
            display::print_job(&job);
        }

        Commands::List => {
            let snapshot: DownloadsSnapshot =
                client.call("downloads.list.v1", json!([])).await?;
            display::print_section("Active", &snapshot.active);
            display::print_section("History", &snapshot.history);
        }

        Commands::OutputDir => {
            let result: OutputDirResult =
                client.call("settings.output_dir.v1", json!([])).await?;
            println!("{}", result.path);
        }

        Commands::SetOutputDir { path } => {
            let result: OutputDirResult = client
                .call("settings.set_output_dir.v1", json!({ "path": path }))
                .await?;
            println!(
                "{}",
                format!("✓ Output directory set to {}", result.path).green().bold()
            );
        }

        Commands::Fetch {
            urls,
            file,
            settings,
            default_output_dir,
            ytdlp,
        } => {
            let urls = collect_urls(&urls, file.as_deref())?;
            let summary = fetch::run(
                urls,
                fetch::FetchOptions {
                    settings_path: expand(&settings),
                    default_output_dir: expand(&default_output_dir),
                    ytdlp_path: expand(&ytdlp),
                },
            )
            .await?;

            if !summary.failed.is_empty() {
                anyhow::bail!("{} downloads failed", summary.failed.len());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_urls_splits_arguments() {
        let args = vec![
            "https://x/1, https://x/2".to_string(),
            "https://x/3".to_string(),
        ];

        let urls = collect_urls(&args, None).unwrap();

        assert_eq!(urls, vec!["https://x/1", "https://x/2", "https://x/3"]);
    }

    #[test]
    fn test_collect_urls_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.txt");
        std::fs::write(&path, "https://x/a\n\n  https://x/b  \n").unwrap();

        let urls = collect_urls(&["https://x/0".to_string()], Some(path.as_path())).unwrap();

        assert_eq!(urls, vec!["https://x/0", "https://x/a", "https://x/b"]);
    }

    #[test]
    fn test_missing_url_file_is_an_error() {
        let result = collect_urls(&[], Some(Path::new("/nonexistent/urls.txt")));

        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_submit_with_wait() {
        let cli = Cli::parse_from(["mediafetch", "submit", "--wait", "https://x/1"]);

        match cli.command {
            Commands::Submit { urls, wait, .. } => {
                assert!(wait);
                assert_eq!(urls, vec!["https://x/1"]);
            }
            _ => panic!("expected submit"),
        }
    }
}
