//! Host configuration, read from a RON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pwa_logging::pwa_info;
use pwa_worker::{FetchSettings, FetchStrategy, DEFAULT_CACHE_NAME};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Origin the page is served from; relative URLs resolve against it.
    pub origin: String,
    pub worker_url: String,
    /// Post-install redirect. Falls back to the manifest's `start_url`.
    pub start_url: Option<String>,
    pub cache_name: String,
    /// Persist the cache here; without it the cache lives in memory.
    pub cache_dir: Option<PathBuf>,
    pub strategy: FetchStrategy,
    /// Explicit precache manifest. Wins over `static_root` discovery.
    pub precache: Option<Vec<String>>,
    pub static_root: Option<PathBuf>,
    pub static_url: String,
    pub fetch: FetchConfig,
    /// `PWA_*` settings for the web app manifest.
    pub manifest: BTreeMap<String, Value>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8000/".to_string(),
            worker_url: "/pwa/pwa_service_worker.js".to_string(),
            start_url: None,
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            cache_dir: None,
            strategy: FetchStrategy::default(),
            precache: None,
            static_root: None,
            static_url: "/static/".to_string(),
            fetch: FetchConfig::default(),
            manifest: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let defaults = FetchSettings::default();
        Self {
            connect_timeout_ms: defaults.connect_timeout.as_millis() as u64,
            request_timeout_ms: defaults.request_timeout.as_millis() as u64,
            redirect_limit: defaults.redirect_limit,
            max_bytes: defaults.max_bytes,
        }
    }
}

impl FetchConfig {
    pub fn settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
        }
    }
}

impl HostConfig {
    /// Loads the config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                pwa_info!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    /// Where to send the page after `appinstalled`.
    pub fn resolved_start_url(&self) -> String {
        self.start_url
            .clone()
            .or_else(|| {
                self.manifest
                    .get("PWA_START_URL")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "/".to_string())
    }
}
