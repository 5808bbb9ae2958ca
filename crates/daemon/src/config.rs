//! Daemon configuration from `MEDIAFETCH_*` environment variables

use mediafetch_api_rpc::server::{RpcServerConfig, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
use mediafetch_core::application::{DispatcherConfig, DEFAULT_GRACE_PERIOD, DEFAULT_HISTORY_CAPACITY};
use mediafetch_core::error::{AppError, Result};
use mediafetch_core::port::DEFAULT_OUTPUT_DIR;
use mediafetch_infra_system::DEFAULT_YTDLP_PROGRAM;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SETTINGS_PATH: &str = "~/.mediafetch/settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub rpc: RpcServerConfig,
    pub settings_path: PathBuf,
    pub default_output_dir: PathBuf,
    pub grace_period: Duration,
    pub history_capacity: usize,
    pub max_concurrent: Option<usize>,
    pub ytdlp_path: PathBuf,
    pub download_timeout: Option<Duration>,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let history_capacity = parse_or(&get, "MEDIAFETCH_HISTORY_CAPACITY", DEFAULT_HISTORY_CAPACITY)?;
        if history_capacity == 0 {
            return Err(AppError::Config(
                "MEDIAFETCH_HISTORY_CAPACITY must be at least 1".to_string(),
            ));
        }

        let max_concurrent = parse_opt::<usize, _>(&get, "MEDIAFETCH_MAX_CONCURRENT")?;
        if max_concurrent == Some(0) {
            return Err(AppError::Config(
                "MEDIAFETCH_MAX_CONCURRENT must be at least 1".to_string(),
            ));
        }

        let log_format = match get("MEDIAFETCH_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "MEDIAFETCH_LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            rpc: RpcServerConfig {
                host: get("MEDIAFETCH_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
                port: parse_or(&get, "MEDIAFETCH_RPC_PORT", DEFAULT_RPC_PORT)?,
            },
            settings_path: expand(
                &get("MEDIAFETCH_SETTINGS_PATH").unwrap_or_else(|| DEFAULT_SETTINGS_PATH.to_string()),
            ),
            default_output_dir: expand(
                &get("MEDIAFETCH_DEFAULT_OUTPUT_DIR").unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
            ),
            grace_period: Duration::from_secs(parse_or(
                &get,
                "MEDIAFETCH_GRACE_PERIOD_SECS",
                DEFAULT_GRACE_PERIOD.as_secs(),
            )?),
            history_capacity,
            max_concurrent,
            ytdlp_path: get("MEDIAFETCH_YTDLP_PATH")
                .map(|p| expand(&p))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP_PROGRAM)),
            download_timeout: parse_opt::<u64, _>(&get, "MEDIAFETCH_DOWNLOAD_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            log_format,
            log_dir: get("MEDIAFETCH_LOG_DIR").map(|p| expand(&p)),
        })
    }

    pub fn dispatcher(&self) -> DispatcherConfig {
        DispatcherConfig {
            grace_period: self.grace_period,
            max_concurrent: self.max_concurrent,
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

fn parse_opt<T, G>(get: &G, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| AppError::Config(format!("{}='{}': {}", key, raw, e)))
        })
        .transpose()
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}
