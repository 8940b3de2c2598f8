//! Logging system configuration and initialization
//!
//! Console output always, plus an optional plain-text or JSON file sink.
//! The returned [`LoggingGuard`] must stay alive for the whole run, otherwise
//! buffered file lines are lost.

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, time::ChronoLocal},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use super::config::{AppConfig, LogLevel};

/// Local time with millisecond precision
fn local_timer() -> ChronoLocal {
    ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string())
}

/// Stdout layer, built for whichever subscriber stack it is added to
fn console_layer<S>(enabled: bool) -> Option<impl Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    enabled.then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_timer(local_timer())
            .with_target(false)
    })
}

/// Logging settings derived from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<PathBuf>,
    pub json_format: bool,
    pub console_output: bool,
}

impl LoggingConfig {
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            level: config.log_level()?,
            file: config.log_file.clone(),
            json_format: config.log_json,
            console_output: true,
        })
    }

    /// Verbose override from the command line
    pub fn verbose(mut self) -> Self {
        self.level = LogLevel::Debug;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            json_format: false,
            console_output: true,
        }
    }
}

/// Keeps the non-blocking file writer flushing until dropped
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter for our own crate at the configured level, dependencies quieter
///
/// `RUST_LOG` overrides everything, e.g.
/// ```bash
/// RUST_LOG="debug,reqwest=debug,hyper=debug" jumbo-facets
/// ```
pub fn build_env_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = [
            level.as_directive().to_string(),
            "reqwest=warn".to_string(),
            "hyper=warn".to_string(),
            "hyper_util=warn".to_string(),
            "h2=warn".to_string(),
            "html5ever=warn".to_string(),
            "selectors=warn".to_string(),
            format!("jumbo_facets={}", level.as_directive()),
        ];
        EnvFilter::new(directives.join(","))
    })
}

/// Rename an existing log file with its modification timestamp so each run starts fresh
fn rotate_existing_log_file(log_file: &Path) -> Result<Option<PathBuf>> {
    if !log_file.exists() {
        return Ok(None);
    }

    let metadata = std::fs::metadata(log_file)
        .with_context(|| format!("Failed to get log file metadata: {}", log_file.display()))?;
    let modified = metadata
        .modified()
        .unwrap_or_else(|_| std::time::SystemTime::now());
    let stamp: chrono::DateTime<Local> = modified.into();

    let stem = log_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scraper".to_string());
    let rotated = log_file.with_file_name(format!("{}.{}.log", stem, stamp.format("%Y%m%dT%H%M%S")));

    std::fs::rename(log_file, &rotated).with_context(|| {
        format!(
            "Failed to rotate log file {} to {}",
            log_file.display(),
            rotated.display()
        )
    })?;
    Ok(Some(rotated))
}

/// Initialize logging with custom configuration
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<LoggingGuard> {
    let env_filter = build_env_filter(config.level);
    let registry = Registry::default().with(env_filter);

    let mut rotated = None;
    let guard = match &config.file {
        Some(path) => {
            let log_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Log file path has no file name: {}", path.display()))?;

            std::fs::create_dir_all(&log_dir)
                .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;
            rotated = rotate_existing_log_file(path)?;

            let (file_writer, file_guard) = non_blocking(rolling::never(&log_dir, file_name));

            if config.json_format {
                let file_layer = fmt::Layer::new()
                    .json()
                    .with_writer(file_writer)
                    .with_timer(local_timer())
                    .with_target(true)
                    .with_ansi(false);
                registry
                    .with(file_layer)
                    .with(console_layer(config.console_output))
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install logger: {e}"))?;
            } else {
                let file_layer = fmt::Layer::new()
                    .with_writer(file_writer)
                    .with_timer(local_timer())
                    .with_target(false)
                    .with_ansi(false);
                registry
                    .with(file_layer)
                    .with(console_layer(config.console_output))
                    .try_init()
                    .map_err(|e| anyhow!("Failed to install logger: {e}"))?;
            }
            Some(file_guard)
        }
        None => {
            if !config.console_output {
                return Err(anyhow!("No logging output configured"));
            }
            registry
                .with(console_layer(true))
                .try_init()
                .map_err(|e| anyhow!("Failed to install logger: {e}"))?;
            None
        }
    };

    info!("📝 Logging system initialized");
    info!("Log level: {:?}", config.level);
    if let Some(path) = &config.file {
        info!("Log file: {:?} (JSON format: {})", path, config.json_format);
    }
    if let Some(previous) = rotated {
        info!("Rotated previous log file to: {:?}", previous);
    }

    Ok(LoggingGuard { _file_guard: guard })
}
