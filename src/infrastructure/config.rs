//! Configuration infrastructure
//!
//! Loads the YAML configuration file through the `config` crate, overlays
//! `JUMBO_FACETS_*` environment variables and validates the result before any
//! network I/O happens.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::scraper_error::{ScraperError, ScraperResult};
use crate::domain::constants::{extraction, fetch, site};

/// Environment prefix for overrides, e.g. `JUMBO_FACETS_TIMEOUT=10`
pub const ENV_PREFIX: &str = "JUMBO_FACETS";

/// A `(name, path)` pair seeding the category list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub path: String,
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Site root; categories are discovered from here
    pub site_url: String,

    /// Markdown report path; the JSON report sits next to it
    pub output_file: PathBuf,

    /// Retries after the first attempt
    pub max_retries: u32,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Politeness delay and backoff base, in seconds
    #[serde(default = "defaults::delay_between_requests")]
    pub delay_between_requests: f64,

    /// One of DEBUG, INFO, WARNING, ERROR, CRITICAL
    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    /// Optional log file sink
    #[serde(default = "defaults::log_file")]
    pub log_file: Option<PathBuf>,

    /// Write JSON lines to the log file
    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Token every genuine page of the site contains
    #[serde(default = "defaults::site_identity")]
    pub site_identity: String,

    /// Cap on filters per category, base filters included
    #[serde(default = "defaults::max_filters")]
    pub max_filters: usize,

    /// Static category list; empty means discover from the site root
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

mod defaults {
    use super::{extraction, fetch, site};
    use std::path::PathBuf;

    pub fn delay_between_requests() -> f64 {
        fetch::DEFAULT_DELAY_SECONDS
    }

    pub fn log_level() -> String {
        "INFO".to_string()
    }

    #[allow(clippy::unnecessary_wraps)]
    pub fn log_file() -> Option<PathBuf> {
        Some(PathBuf::from("logs/scraper.log"))
    }

    pub fn user_agent() -> String {
        site::DEFAULT_USER_AGENT.to_string()
    }

    pub fn site_identity() -> String {
        site::IDENTITY_TOKEN.to_string()
    }

    pub fn max_filters() -> usize {
        extraction::MAX_FILTERS
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_url: site::BASE_URL.to_string(),
            output_file: PathBuf::from("output/categorias_jumbo.md"),
            max_retries: fetch::DEFAULT_MAX_RETRIES,
            timeout: fetch::DEFAULT_TIMEOUT_SECONDS,
            delay_between_requests: defaults::delay_between_requests(),
            log_level: defaults::log_level(),
            log_file: defaults::log_file(),
            log_json: false,
            user_agent: defaults::user_agent(),
            site_identity: defaults::site_identity(),
            max_filters: defaults::max_filters(),
            categories: Vec::new(),
        }
    }
}

/// Recognized log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn parse(value: &str) -> ScraperResult<Self> {
        match value.trim().to_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            other => Err(ScraperError::configuration(
                "log_level",
                format!("'{other}' is not one of DEBUG, INFO, WARNING, ERROR, CRITICAL"),
            )),
        }
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Zero when the configured value is not a representable duration;
    /// `validate()` rejects those values up front
    pub fn delay_between_requests(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_between_requests).unwrap_or(Duration::ZERO)
    }

    pub fn log_level(&self) -> ScraperResult<LogLevel> {
        LogLevel::parse(&self.log_level)
    }

    /// JSON report path derived from the Markdown one
    pub fn json_output_file(&self) -> PathBuf {
        self.output_file.with_extension("json")
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> ScraperResult<()> {
        let parsed = url::Url::parse(&self.site_url)
            .map_err(|e| ScraperError::configuration("site_url", format!("invalid URL: {e}")))?;
        if parsed.scheme() != "https" {
            return Err(ScraperError::configuration(
                "site_url",
                "must be an https:// URL",
            ));
        }

        if self.timeout < 1 {
            return Err(ScraperError::configuration("timeout", "must be at least 1 second"));
        }

        if !self.delay_between_requests.is_finite() || self.delay_between_requests < 0.0 {
            return Err(ScraperError::configuration(
                "delay_between_requests",
                "must not be negative",
            ));
        }
        if Duration::try_from_secs_f64(self.delay_between_requests).is_err() {
            return Err(ScraperError::configuration(
                "delay_between_requests",
                format!("{} seconds is out of range", self.delay_between_requests),
            ));
        }

        if self.output_file.as_os_str().is_empty() {
            return Err(ScraperError::configuration("output_file", "must not be empty"));
        }

        if self.max_filters < extraction::BASE_FILTERS.len() {
            return Err(ScraperError::configuration(
                "max_filters",
                format!("must be at least {}", extraction::BASE_FILTERS.len()),
            ));
        }

        if self.site_identity.trim().is_empty() {
            return Err(ScraperError::configuration("site_identity", "must not be empty"));
        }

        for seed in &self.categories {
            if !seed.path.starts_with('/') {
                return Err(ScraperError::configuration(
                    "categories",
                    format!("path '{}' of '{}' must start with '/'", seed.path, seed.name),
                ));
            }
        }

        self.log_level()?;
        Ok(())
    }
}

/// Configuration manager for locating and loading settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Default location: `config/config.yaml` under the working directory,
    /// falling back to the user configuration directory
    pub fn new() -> Self {
        let local = PathBuf::from("config").join("config.yaml");
        if local.exists() {
            return Self { config_path: local };
        }

        let config_path = dirs::config_dir()
            .map(|dir| dir.join("jumbo-facets").join("config.yaml"))
            .unwrap_or(local);
        Self { config_path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load, overlay environment overrides and validate
    pub fn load_config(&self) -> ScraperResult<AppConfig> {
        if !self.config_path.exists() {
            return Err(ScraperError::configuration(
                "config",
                format!("configuration file not found: {}", self.config_path.display()),
            ));
        }

        debug!("Reading configuration from {:?}", self.config_path);
        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.config_path.as_path())
                    .format(config::FileFormat::Yaml)
                    .required(true),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| ScraperError::configuration("config", format!("failed to parse configuration: {e}")))?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| ScraperError::configuration("config", e.to_string()))?;

        app_config.validate()?;
        info!("Loaded configuration from: {:?}", self.config_path);
        Ok(app_config)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
