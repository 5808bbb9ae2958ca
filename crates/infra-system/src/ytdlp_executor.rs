// yt-dlp executor
// reason: tokio::process for async child management, kill_on_drop for timeouts
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use mediafetch_core::port::{DownloadExecutor, ExecutionError};

/// Program looked up on PATH when none is configured
pub const DEFAULT_YTDLP_PROGRAM: &str = "yt-dlp";

/// Best MP4 video plus M4A audio, falling back to the best single MP4, then anything
pub const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// Output file template, relative to the destination directory
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Runs the external `yt-dlp` tool, one child process per download
pub struct YtDlpExecutor {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl YtDlpExecutor {
    /// Create an executor for `program` with no time limit
    ///
    /// # Example
    /// ```ignore
    /// let executor = YtDlpExecutor::new("yt-dlp").with_timeout(Some(Duration::from_secs(3600)));
    /// ```
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the child if it runs longer than `limit`
    pub fn with_timeout(mut self, limit: Option<Duration>) -> Self {
        self.timeout = limit;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for one download
    fn build_args(url: &str, destination: &Path) -> Vec<OsString> {
        vec![
            "--format".into(),
            FORMAT_SELECTOR.into(),
            "--output".into(),
            destination.join(OUTPUT_TEMPLATE).into_os_string(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            url.into(),
        ]
    }

    /// Spawn the child and collect its exit status and stderr
    async fn spawn_and_wait(
        &self,
        url: &str,
        destination: &Path,
    ) -> Result<std::process::Output, ExecutionError> {
        let child = Command::new(&self.program)
            .args(Self::build_args(url, destination))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExecutionError::SpawnFailed(format!("{}: {}", self.program.display(), e))
            })?;

        match self.timeout {
            // Dropping the wait future drops the child, which kills it
            Some(limit) => match timeout(limit, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(ExecutionError::IoError(e.to_string())),
                Err(_) => Err(ExecutionError::Timeout(limit.as_secs())),
            },
            None => child
                .wait_with_output()
                .await
                .map_err(|e| ExecutionError::IoError(e.to_string())),
        }
    }
}

impl Default for YtDlpExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_YTDLP_PROGRAM)
    }
}

/// Turn a finished child into the download outcome
fn interpret_output(output: &std::process::Output) -> Result<(), ExecutionError> {
    if output.status.success() {
        return Ok(());
    }

    let exit_code = output.status.code();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    let message = if !stderr.is_empty() {
        stderr.to_string()
    } else {
        match exit_code {
            Some(code) => format!("yt-dlp exited with code {}", code),
            None => "yt-dlp was terminated by a signal".to_string(),
        }
    };

    Err(ExecutionError::Failed { exit_code, message })
}

#[async_trait]
impl DownloadExecutor for YtDlpExecutor {
    async fn execute(&self, url: &str, destination: &Path) -> Result<(), ExecutionError> {
        info!(
            program = %self.program.display(),
            url = %url,
            destination = %destination.display(),
            timeout_secs = ?self.timeout.map(|t| t.as_secs()),
            "Starting yt-dlp"
        );

        let output = self.spawn_and_wait(url, destination).await?;
        let result = interpret_output(&output);

        debug!(url = %url, exit_code = ?output.status.code(), "yt-dlp exited");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_are_fixed_and_url_is_last() {
        let args = YtDlpExecutor::build_args("https://x/v", Path::new("/tmp/out"));

        assert_eq!(args[0], "--format");
        assert_eq!(args[1], FORMAT_SELECTOR);
        assert_eq!(args[2], "--output");
        assert_eq!(args[3], Path::new("/tmp/out").join("%(title)s.%(ext)s").into_os_string());
        assert!(args.contains(&OsString::from("--no-playlist")));
        assert!(args.contains(&OsString::from("--no-warnings")));
        assert_eq!(args.last().unwrap(), "https://x/v");
    }

    #[test]
    fn test_default_program_is_ytdlp() {
        assert_eq!(YtDlpExecutor::default().program(), Path::new("yt-dlp"));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_failure() {
        let executor = YtDlpExecutor::new("/nonexistent/mediafetch-yt-dlp");

        let result = executor.execute("https://x/v", Path::new(".")).await;

        assert!(matches!(result, Err(ExecutionError::SpawnFailed(_))));
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for yt-dlp
        fn fake_program(dir: &tempfile::TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("fake-yt-dlp");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_zero_exit_is_success() {
            let executor = YtDlpExecutor::new("true");

            let result = executor.execute("https://x/v", Path::new(".")).await;

            assert!(result.is_ok());
        }

        #[tokio::test]
        async fn test_nonzero_exit_without_stderr_reports_code() {
            let executor = YtDlpExecutor::new("false");

            let err = executor.execute("https://x/v", Path::new(".")).await.unwrap_err();

            match err {
                ExecutionError::Failed { exit_code, message } => {
                    assert_eq!(exit_code, Some(1));
                    assert_eq!(message, "yt-dlp exited with code 1");
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_stderr_becomes_message() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_program(&dir, "echo '  ERROR: Unsupported URL  ' >&2\nexit 2");
            let executor = YtDlpExecutor::new(program);

            let err = executor.execute("https://x/v", dir.path()).await.unwrap_err();

            assert_eq!(err.to_string(), "ERROR: Unsupported URL");
            assert!(matches!(err, ExecutionError::Failed { exit_code: Some(2), .. }));
        }

        #[tokio::test]
        async fn test_timeout_kills_child() {
            let dir = tempfile::tempdir().unwrap();
            let program = fake_program(&dir, "sleep 10");
            let executor =
                YtDlpExecutor::new(program).with_timeout(Some(Duration::from_millis(200)));

            let result = executor.execute("https://x/v", dir.path()).await;

            assert!(matches!(result, Err(ExecutionError::Timeout(_))));
        }
    }
}
