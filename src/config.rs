//! Layered settings: built-in defaults, an optional TOML file, `VARDASH_*`
//! environment variables, then command-line flags.
//!
//! ```toml
//! url = "http://gateway-host:8081"
//! refresh = "2s"
//! timeout = "1500ms"
//!
//! [[dashboard.histograms]]
//! id = "rpc"
//! title = "RPC latency"
//! metric = "rpc.timing"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::Dashboard;
use crate::source::{DEFAULT_PATH, DEFAULT_TIMEOUT};

pub const DEFAULT_URL: &str = "http://localhost:8081";
pub const DEFAULT_REFRESH: Duration = Duration::from_secs(1);
pub const DEFAULT_LOG_FILE: &str = "vardash.log";

/// Settings as written in the file or environment, durations still as text.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawSettings {
    url: Option<String>,
    path: Option<String>,
    refresh: Option<String>,
    timeout: Option<String>,
    log_file: Option<PathBuf>,
    dashboard: Option<Dashboard>,
}

/// Values given on the command line; each one wins over file and env.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub refresh: Option<String>,
    pub timeout: Option<String>,
    pub log_file: Option<PathBuf>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Endpoint base URL, without the metrics path.
    pub url: String,
    pub path: String,
    pub refresh: Duration,
    pub timeout: Duration,
    pub log_file: PathBuf,
    pub dashboard: Dashboard,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            path: DEFAULT_PATH.to_string(),
            refresh: DEFAULT_REFRESH,
            timeout: DEFAULT_TIMEOUT,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            dashboard: Dashboard::default(),
        }
    }
}

/// Load settings from `config_path` (if any) and the environment, then
/// apply command-line overrides.
pub fn load_settings(config_path: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let mut builder = Config::builder();
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path));
    }
    let config = builder
        .add_source(Environment::with_prefix("VARDASH"))
        .build()
        .context("failed to read settings")?;

    let raw: RawSettings = config
        .try_deserialize()
        .context("invalid settings")?;

    resolve(raw, overrides)
}

fn resolve(raw: RawSettings, overrides: Overrides) -> Result<Settings> {
    let defaults = Settings::default();

    let refresh = match overrides.refresh.or(raw.refresh) {
        Some(text) => parse_duration(&text).context("invalid refresh interval")?,
        None => defaults.refresh,
    };
    let timeout = match overrides.timeout.or(raw.timeout) {
        Some(text) => parse_duration(&text).context("invalid request timeout")?,
        None => defaults.timeout,
    };
    if refresh.is_zero() {
        anyhow::bail!("refresh interval must be greater than zero");
    }
    if timeout.is_zero() {
        anyhow::bail!("request timeout must be greater than zero");
    }

    Ok(Settings {
        url: overrides.url.or(raw.url).unwrap_or(defaults.url),
        path: raw.path.unwrap_or(defaults.path),
        refresh,
        timeout,
        log_file: overrides.log_file.or(raw.log_file).unwrap_or(defaults.log_file),
        dashboard: raw.dashboard.unwrap_or(defaults.dashboard),
    })
}
