//! HTTP client for page fetching with retry, backoff and content validation
//!
//! The network sits behind [`PageTransport`] so the retry loop can be driven
//! by scripted transports in tests. [`ReqwestTransport`] is the production
//! implementation: one cookie-keeping session with a fixed header set.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, UPGRADE_INSECURE_REQUESTS};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::config::AppConfig;
use super::retry_policy::{ErrorClassification, FailureClassifier, RetryPolicy, StandardFailureClassifier};
use super::scraper_error::{NetworkErrorKind, ScraperError, ScraperResult};
use crate::domain::constants::{fetch, site};

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Attempt budget and backoff base
    pub retry: RetryPolicy,
    /// Bodies shorter than this are soft failures
    pub min_content_chars: usize,
    /// User agent string
    pub user_agent: String,
}

impl HttpClientConfig {
    /// Create HttpClientConfig from the application configuration
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout: config.timeout(),
            retry: RetryPolicy::new(config.max_retries, config.delay_between_requests()),
            min_content_chars: fetch::MIN_CONTENT_CHARS,
            user_agent: config.user_agent.clone(),
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(fetch::DEFAULT_TIMEOUT_SECONDS),
            retry: RetryPolicy::default(),
            min_content_chars: fetch::MIN_CONTENT_CHARS,
            user_agent: site::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Raw response of a single GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// A single GET against the target site
#[async_trait]
pub trait PageTransport: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> ScraperResult<TransportResponse>;
}

/// reqwest-backed transport sharing one session across requests
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str) -> ScraperResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(site::ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(site::ACCEPT_LANGUAGE));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));

        let client = ClientBuilder::new()
            .user_agent(user_agent)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(fetch::MAX_REDIRECTS))
            .build()
            .map_err(|e| ScraperError::configuration("user_agent", format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> ScraperResult<TransportResponse> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, &e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ScraperError::network(url, NetworkErrorKind::Body, e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

fn classify_reqwest_error(url: &str, error: &reqwest::Error) -> ScraperError {
    let kind = if error.is_timeout() {
        NetworkErrorKind::Timeout
    } else if error.is_connect() {
        NetworkErrorKind::Connection
    } else {
        NetworkErrorKind::Other
    };
    ScraperError::network(url, kind, error.to_string())
}

/// Terminal status of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Ok,
    Failed(ScraperError),
}

/// Outcome of [`HttpClient::fetch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub content: Option<String>,
    pub status: FetchStatus,
    /// GETs actually issued
    pub attempts: u32,
}

impl FetchResult {
    fn ok(content: String, attempts: u32) -> Self {
        Self {
            content: Some(content),
            status: FetchStatus::Ok,
            attempts,
        }
    }

    fn failed(error: ScraperError, attempts: u32) -> Self {
        Self {
            content: None,
            status: FetchStatus::Failed(error),
            attempts,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.status, FetchStatus::Ok)
    }

    /// Content on success, the last error otherwise
    pub fn into_result(self) -> ScraperResult<String> {
        match (self.status, self.content) {
            (FetchStatus::Ok, Some(content)) => Ok(content),
            (FetchStatus::Failed(error), _) => Err(error),
            (FetchStatus::Ok, None) => Err(ScraperError::ContentTooSmall {
                url: String::new(),
                length: 0,
                minimum: fetch::MIN_CONTENT_CHARS,
            }),
        }
    }
}

/// Retrying page fetcher
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn PageTransport>,
    classifier: Arc<dyn FailureClassifier>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a client backed by a real HTTP session
    pub fn with_config(config: HttpClientConfig) -> ScraperResult<Self> {
        let transport = ReqwestTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: HttpClientConfig, transport: Arc<dyn PageTransport>) -> Self {
        Self {
            transport,
            classifier: Arc::new(StandardFailureClassifier),
            config,
        }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Fetch a page using the configured policy
    pub async fn fetch(&self, url: &str) -> FetchResult {
        self.fetch_with(url, self.config.retry, self.config.timeout).await
    }

    /// Fetch a page with an explicit retry policy and timeout
    pub async fn fetch_with(&self, url: &str, policy: RetryPolicy, timeout: Duration) -> FetchResult {
        let mut last_error: Option<ScraperError> = None;
        let mut attempts = 0;

        for attempt in 0..policy.max_attempts() {
            attempts += 1;
            debug!("🌐 HTTP GET (attempt {}/{}): {}", attempt + 1, policy.max_attempts(), url);

            let error = match self.fetch_once(url, timeout).await {
                Ok(content) => {
                    debug!("✅ Fetched {} ({} chars) on attempt {}", url, content.chars().count(), attempt + 1);
                    return FetchResult::ok(content, attempts);
                }
                Err(e) => e,
            };

            let classification = self.classifier.classify(&error);
            warn!("⚠️ Attempt {} failed for {}: {}", attempt + 1, url, error.reason());
            last_error = Some(error);

            if let ErrorClassification::NonRetryable(reason) = classification {
                debug!("Not retrying {}: {}", url, reason);
                break;
            }

            if let Some(delay) = policy.delay_after(attempt) {
                info!("⏳ Waiting {:?} before next attempt for {}", delay, url);
                sleep(delay).await;
            }
        }

        let error = last_error.unwrap_or_else(|| {
            ScraperError::network(url, NetworkErrorKind::Other, "no attempt was made")
        });
        error!("❌ All attempts failed for {}. Last error: {}", url, error);
        FetchResult::failed(error, attempts)
    }

    /// Single attempt including status and size validation
    async fn fetch_once(&self, url: &str, timeout: Duration) -> ScraperResult<String> {
        let response = self.transport.get(url, timeout).await?;

        if !(200..300).contains(&response.status) {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        let length = response.body.chars().count();
        if length < self.config.min_content_chars {
            return Err(ScraperError::ContentTooSmall {
                url: url.to_string(),
                length,
                minimum: self.config.min_content_chars,
            });
        }

        Ok(response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays canned responses in order, repeating the last one
    struct ScriptedTransport {
        script: Vec<ScraperResult<TransportResponse>>,
        calls: Mutex<usize>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<ScraperResult<TransportResponse>>) -> Self {
            Self {
                script,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl PageTransport for ScriptedTransport {
        async fn get(&self, _url: &str, _timeout: Duration) -> ScraperResult<TransportResponse> {
            let mut calls = self.calls.lock().unwrap();
            let index = (*calls).min(self.script.len() - 1);
            *calls += 1;
            self.script[index].clone()
        }
    }

    fn page(status: u16, body: &str) -> ScraperResult<TransportResponse> {
        Ok(TransportResponse {
            status,
            body: body.to_string(),
        })
    }

    fn client(script: Vec<ScraperResult<TransportResponse>>, max_retries: u32) -> HttpClient {
        let config = HttpClientConfig {
            retry: RetryPolicy::new(max_retries, Duration::ZERO),
            ..HttpClientConfig::default()
        };
        HttpClient::with_transport(config, Arc::new(ScriptedTransport::new(script)))
    }

    #[tokio::test]
    async fn test_small_body_is_retried_until_a_real_page_arrives() {
        let full = "x".repeat(150);
        let client = client(vec![page(200, "blocked"), page(200, &full)], 2);

        let result = client.fetch("https://example.com").await;
        assert!(result.is_ok());
        assert_eq!(result.attempts, 2);
        assert_eq!(result.content.as_deref(), Some(full.as_str()));
    }

    #[tokio::test]
    async fn test_redirected_success_counts_as_success() {
        // Redirects are resolved by the transport; the client only sees the final status
        let client = client(vec![page(203, &"y".repeat(100))], 0);
        assert!(client.fetch("https://example.com").await.is_ok());
    }

    #[tokio::test]
    async fn test_forbidden_is_not_retried() {
        let client = client(vec![page(403, "")], 5);
        let result = client.fetch("https://example.com").await;
        assert_eq!(result.attempts, 1);
        assert!(matches!(
            result.status,
            FetchStatus::Failed(ScraperError::HttpStatus { status: 403, .. })
        ));
    }

    #[test]
    fn test_into_result_surfaces_last_error() {
        let result = FetchResult::failed(
            ScraperError::HttpStatus {
                url: "u".into(),
                status: 500,
            },
            4,
        );
        assert_eq!(result.into_result().unwrap_err().reason(), "HTTP 500");
    }
}
