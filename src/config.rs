//! Configuration: environment-driven settings and the switches file.

use crate::restconf::SwitchTarget;

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Offset histogram bucket boundaries, nanoseconds.
const DEFAULT_OFFSET_BUCKETS: [i64; 11] = [-200, -100, -75, -50, -25, 0, 25, 50, 75, 100, 200];

const SWITCHES_FILENAME: &str = "switches.yaml";

/// Configuration error types.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find {0} in any of: {1:?}")]
    NotFound(String, Vec<PathBuf>),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("{} lists no switches", .0.display())]
    Empty(PathBuf),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP port for metrics and health endpoints (default: 8080)
    pub http_port: u16,
    /// Minimum spacing between poll round starts (default: 500ms)
    pub poll_interval: Duration,
    /// Console report cadence (default: 10s)
    pub report_interval: Duration,
    /// Per-fetch timeout (default: 5s)
    pub request_timeout: Duration,
    /// Explicit switches file path; otherwise the search paths are used
    pub switches_file: Option<PathBuf>,
    /// Offset histogram bucket boundaries
    pub offset_buckets: Vec<i64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            poll_interval: Duration::from_millis(500),
            report_interval: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
            switches_file: None,
            offset_buckets: DEFAULT_OFFSET_BUCKETS.to_vec(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PTPWATCH_HTTP_PORT`: HTTP port
    /// - `PTPWATCH_POLL_INTERVAL_MS`: poll round cadence
    /// - `PTPWATCH_REPORT_INTERVAL_MS`: console report cadence
    /// - `PTPWATCH_REQUEST_TIMEOUT_MS`: per-fetch timeout
    /// - `PTPWATCH_SWITCHES_FILE`: explicit switches file path
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(port_str) = env::var("PTPWATCH_HTTP_PORT") {
            if let Ok(port) = port_str.parse() {
                cfg.http_port = port;
            }
        }
        if let Some(interval) = env_millis("PTPWATCH_POLL_INTERVAL_MS") {
            cfg.poll_interval = interval;
        }
        if let Some(interval) = env_millis("PTPWATCH_REPORT_INTERVAL_MS") {
            cfg.report_interval = interval;
        }
        if let Some(timeout) = env_millis("PTPWATCH_REQUEST_TIMEOUT_MS") {
            cfg.request_timeout = timeout;
        }
        if let Ok(path) = env::var("PTPWATCH_SWITCHES_FILE") {
            cfg.switches_file = Some(PathBuf::from(path));
        }

        cfg
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    env::var(key).ok()?.parse().ok().map(Duration::from_millis)
}

#[derive(Debug, Deserialize)]
struct SwitchesFile {
    switches: Vec<SwitchTarget>,
}

/// Locate and parse the switches file.
///
/// Without an explicit path, searches `$XDG_CONFIG_HOME`, `~/.config`, and
/// the working directory for `switches.yaml`. An unlocatable, unparseable,
/// or empty file is fatal: there is no fleet to monitor without it.
pub fn load_switches(explicit: Option<&Path>) -> Result<Vec<SwitchTarget>, ConfigError> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let searched = search_paths();
            searched
                .iter()
                .map(|dir| dir.join(SWITCHES_FILENAME))
                .find(|p| p.is_file())
                .ok_or_else(|| ConfigError::NotFound(SWITCHES_FILENAME.to_string(), searched))?
        }
    };
    parse_switches_file(&path)
}

fn parse_switches_file(path: &Path) -> Result<Vec<SwitchTarget>, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: SwitchesFile = serde_yaml_ng::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if file.switches.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }
    Ok(file.switches)
}

/// Config file search order: `$XDG_CONFIG_HOME`, `~/.config`, then the
/// working directory.
fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg));
    } else if let Ok(home) = env::var("HOME") {
        paths.push(PathBuf::from(home).join(".config"));
    }
    paths.push(PathBuf::from("."));
    paths
}
