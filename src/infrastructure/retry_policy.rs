//! Retry policy for page fetches
//!
//! Classifies fetch failures and computes the linear backoff between attempts.
//! Attempt indices are 0-based: a policy with `max_retries = N` allows
//! attempts `0..=N`.

use std::time::Duration;

use super::scraper_error::{NetworkErrorKind, ScraperError};

/// Outcome of classifying a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClassification {
    Retryable(RetryableCategory),
    NonRetryable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableCategory {
    Timeout,
    Connection,
    ServerError,
    RateLimited,
    ContentTooSmall,
    Transport,
}

/// Decides whether a failed attempt may be retried
pub trait FailureClassifier: Send + Sync {
    fn classify(&self, error: &ScraperError) -> ErrorClassification;
}

/// Classifier matching the site's behaviour: hard 4xx abort, everything
/// transient is retried
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFailureClassifier;

impl FailureClassifier for StandardFailureClassifier {
    fn classify(&self, error: &ScraperError) -> ErrorClassification {
        match error {
            ScraperError::Network { kind, .. } => ErrorClassification::Retryable(match kind {
                NetworkErrorKind::Timeout => RetryableCategory::Timeout,
                NetworkErrorKind::Connection => RetryableCategory::Connection,
                NetworkErrorKind::Body | NetworkErrorKind::Other => RetryableCategory::Transport,
            }),
            ScraperError::HttpStatus { status: 429, .. } => {
                ErrorClassification::Retryable(RetryableCategory::RateLimited)
            }
            ScraperError::HttpStatus { status, .. } if (500..600).contains(status) => {
                ErrorClassification::Retryable(RetryableCategory::ServerError)
            }
            ScraperError::ContentTooSmall { .. } => {
                ErrorClassification::Retryable(RetryableCategory::ContentTooSmall)
            }
            other => ErrorClassification::NonRetryable(other.reason()),
        }
    }
}

/// Attempt budget and backoff base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total GETs allowed for one fetch
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after failed attempt `attempt` (0-based), or `None` when
    /// it was the last one
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        Some(self.base_delay.saturating_mul(attempt + 1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        use crate::domain::constants::fetch;
        Self::new(
            fetch::DEFAULT_MAX_RETRIES,
            Duration::from_secs_f64(fetch::DEFAULT_DELAY_SECONDS),
        )
    }
}
