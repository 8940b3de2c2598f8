//! Error taxonomy for fetching and extraction
//!
//! Fetch errors carry enough context to decide the retry policy; extraction
//! errors never leave the strategy that raised them.

use std::fmt;
use thiserror::Error;

/// Transport-level failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connection,
    Body,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Connection => write!(f, "connection error"),
            Self::Body => write!(f, "body read error"),
            Self::Other => write!(f, "request error"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScraperError {
    #[error("Network error ({kind}) for {url}: {message}")]
    Network {
        url: String,
        kind: NetworkErrorKind,
        message: String,
    },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Response from {url} too small: {length} chars (minimum {minimum})")]
    ContentTooSmall {
        url: String,
        length: usize,
        minimum: usize,
    },

    #[error("Configuration error in '{field}': {message}")]
    Configuration { field: String, message: String },

    #[error("No {target} discovered on {url}")]
    ExtractionEmpty { url: String, target: String },

    #[error("Invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("URL resolution failed for '{href}': {reason}")]
    UrlResolution { href: String, reason: String },
}

impl ScraperError {
    pub fn network(url: &str, kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.to_string(),
            kind,
            message: message.into(),
        }
    }

    pub fn configuration(field: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_selector(selector: &str, reason: impl fmt::Display) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether another attempt at the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::ContentTooSmall { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Configuration { .. }
            | Self::ExtractionEmpty { .. }
            | Self::InvalidSelector { .. }
            | Self::UrlResolution { .. } => false,
        }
    }

    /// Short reason used in logs and degraded results
    pub fn reason(&self) -> String {
        match self {
            Self::Network { kind, .. } => kind.to_string(),
            Self::HttpStatus { status, .. } => format!("HTTP {status}"),
            Self::ContentTooSmall { length, .. } => format!("content too small ({length} chars)"),
            other => other.to_string(),
        }
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;
