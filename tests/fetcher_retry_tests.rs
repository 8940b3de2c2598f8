//! Retry behaviour of the page fetcher over scripted transports
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jumbo_facets::infrastructure::{
    FetchStatus, HttpClient, HttpClientConfig, NetworkErrorKind, PageTransport, RetryPolicy, ScraperError,
    ScraperResult, TransportResponse,
};

/// Serves `failures` copies of `failure`, then a full page
struct FlakyTransport {
    failures: u32,
    failure: ScraperResult<TransportResponse>,
    calls: AtomicU32,
}

impl FlakyTransport {
    fn new(failures: u32, failure: ScraperResult<TransportResponse>) -> Arc<Self> {
        Arc::new(Self {
            failures,
            failure,
            calls: AtomicU32::new(0),
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageTransport for FlakyTransport {
    async fn get(&self, _url: &str, _timeout: Duration) -> ScraperResult<TransportResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            self.failure.clone()
        } else {
            Ok(TransportResponse {
                status: 200,
                body: format!("<html>{}</html>", "jumbo ".repeat(50)),
            })
        }
    }
}

fn status(code: u16) -> ScraperResult<TransportResponse> {
    Ok(TransportResponse {
        status: code,
        body: String::new(),
    })
}

fn client(transport: Arc<FlakyTransport>, max_retries: u32, base_delay: Duration) -> HttpClient {
    let config = HttpClientConfig {
        retry: RetryPolicy::new(max_retries, base_delay),
        ..HttpClientConfig::default()
    };
    HttpClient::with_transport(config, transport)
}

#[tokio::test]
async fn always_retryable_failure_uses_every_attempt() {
    let transport = FlakyTransport::new(u32::MAX, status(503));
    let result = client(transport.clone(), 3, Duration::ZERO)
        .fetch("https://www.jumbo.com.ar/almacen")
        .await;

    assert_eq!(result.attempts, 4);
    assert_eq!(transport.calls(), 4);
    assert!(result.content.is_none());
    assert!(matches!(result.status, FetchStatus::Failed(ScraperError::HttpStatus { status: 503, .. })));
}

#[tokio::test]
async fn not_found_is_attempted_once() {
    let transport = FlakyTransport::new(u32::MAX, status(404));
    let result = client(transport.clone(), 5, Duration::ZERO)
        .fetch("https://www.jumbo.com.ar/nada")
        .await;

    assert_eq!(result.attempts, 1);
    assert_eq!(transport.calls(), 1);
    assert!(!result.is_ok());
}

#[tokio::test]
async fn rate_limit_then_success() {
    let transport = FlakyTransport::new(2, status(429));
    let result = client(transport.clone(), 3, Duration::ZERO)
        .fetch("https://www.jumbo.com.ar/bebidas")
        .await;

    assert!(result.is_ok());
    assert_eq!(result.attempts, 3);
}

#[tokio::test]
async fn timeouts_are_retried() {
    let timeout = Err(ScraperError::network(
        "https://www.jumbo.com.ar",
        NetworkErrorKind::Timeout,
        "operation timed out",
    ));
    let transport = FlakyTransport::new(1, timeout);
    let result = client(transport, 1, Duration::ZERO).fetch("https://www.jumbo.com.ar").await;

    assert!(result.is_ok());
    assert_eq!(result.attempts, 2);
}

#[tokio::test]
async fn tiny_body_exhausts_retries_as_soft_failure() {
    let transport = FlakyTransport::new(u32::MAX, Ok(TransportResponse {
        status: 200,
        body: "x".repeat(99),
    }));
    let result = client(transport, 2, Duration::ZERO).fetch("https://www.jumbo.com.ar").await;

    assert_eq!(result.attempts, 3);
    assert!(matches!(
        result.status,
        FetchStatus::Failed(ScraperError::ContentTooSmall { length: 99, minimum: 100, .. })
    ));
}

#[tokio::test]
async fn backoff_grows_linearly_between_attempts_only() {
    // Waits 20ms then 40ms; nothing after the last attempt
    let transport = FlakyTransport::new(u32::MAX, status(500));
    let started = Instant::now();
    let result = client(transport, 2, Duration::from_millis(20))
        .fetch("https://www.jumbo.com.ar")
        .await;
    let elapsed = started.elapsed();

    assert_eq!(result.attempts, 3);
    assert!(elapsed >= Duration::from_millis(60), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(1000), "elapsed {elapsed:?}");
}
