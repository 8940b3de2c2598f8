//! Infrastructure layer for configuration, logging, HTTP and HTML parsing
//!
//! - `config`: YAML + environment configuration and validation
//! - `logging`: tracing subscriber setup
//! - `scraper_error`: error taxonomy shared by fetching and extraction
//! - `retry_policy`: failure classification and backoff
//! - `http_client`: retrying page fetcher over a pluggable transport
//! - `parsing`: container location, extraction strategies and normalization

pub mod config;
pub mod http_client;
pub mod logging;
pub mod parsing;
pub mod retry_policy;
pub mod scraper_error;

// Re-export commonly used items
pub use config::{AppConfig, CategorySeed, ConfigManager, LogLevel};
pub use http_client::{FetchResult, FetchStatus, HttpClient, HttpClientConfig, PageTransport, ReqwestTransport, TransportResponse};
pub use logging::{LoggingConfig, LoggingGuard, init_logging_with_config};
pub use parsing::{PageParse, PageParser, ParsingConfig};
pub use retry_policy::{FailureClassifier, RetryPolicy, StandardFailureClassifier};
pub use scraper_error::{NetworkErrorKind, ScraperError, ScraperResult};
