//! Site probe: connection test, content validation and site information

use serde::Serialize;
use tracing::{error, info};

use crate::domain::constants::site;
use crate::infrastructure::http_client::{FetchStatus, HttpClient};
use crate::infrastructure::parsing::PageParser;

/// Whether `content` is a genuine page of the site identified by `identity`
pub fn validate_content(content: &str, identity: &str) -> bool {
    let lowered = content.to_lowercase();
    lowered.contains(&identity.to_lowercase())
        && lowered.contains("html")
        && content.chars().count() > site::MIN_VALID_PAGE_CHARS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Accessible,
    InvalidContent,
    Unreachable,
}

/// Snapshot of the site root
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    pub url: String,
    pub status: SiteStatus,
    pub content_length: usize,
    pub has_identity: bool,
    pub title: Option<String>,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct SiteProbe<'a> {
    client: &'a HttpClient,
    site_url: String,
    identity: String,
}

impl<'a> SiteProbe<'a> {
    pub fn new(client: &'a HttpClient, site_url: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            client,
            site_url: site_url.into(),
            identity: identity.into(),
        }
    }

    /// Fetch the root and check it belongs to the site
    pub async fn test_connection(&self) -> bool {
        info!("🔍 Testing connection to {}", self.site_url);
        let result = self.client.fetch(&self.site_url).await;

        match (&result.status, result.content.as_deref()) {
            (FetchStatus::Ok, Some(content)) if validate_content(content, &self.identity) => {
                info!("✅ Connection to {} succeeded", self.site_url);
                true
            }
            (FetchStatus::Ok, _) => {
                error!("❌ {} answered with content that does not belong to the site", self.site_url);
                false
            }
            (FetchStatus::Failed(e), _) => {
                error!("❌ Connection to {} failed: {}", self.site_url, e);
                false
            }
        }
    }

    /// Fetch the root and run the content validation only
    pub async fn validate_site_content(&self) -> bool {
        self.client
            .fetch(&self.site_url)
            .await
            .content
            .is_some_and(|content| validate_content(&content, &self.identity))
    }

    pub async fn site_info(&self) -> SiteInfo {
        info!("📊 Collecting site information for {}", self.site_url);
        let result = self.client.fetch(&self.site_url).await;

        match (result.status, result.content) {
            (FetchStatus::Ok, Some(content)) => {
                let valid = validate_content(&content, &self.identity);
                SiteInfo {
                    url: self.site_url.clone(),
                    status: if valid {
                        SiteStatus::Accessible
                    } else {
                        SiteStatus::InvalidContent
                    },
                    content_length: content.chars().count(),
                    has_identity: content.to_lowercase().contains(&self.identity.to_lowercase()),
                    title: PageParser::page_title(&content),
                    attempts: result.attempts,
                    error: None,
                }
            }
            (status, _) => SiteInfo {
                url: self.site_url.clone(),
                status: SiteStatus::Unreachable,
                content_length: 0,
                has_identity: false,
                title: None,
                attempts: result.attempts,
                error: match status {
                    FetchStatus::Failed(e) => Some(e.reason()),
                    FetchStatus::Ok => None,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(extra: &str) -> String {
        format!("<html><head><title>Jumbo</title></head><body>{}{}</body></html>", extra, "x".repeat(1000))
    }

    #[test]
    fn test_validate_content() {
        assert!(validate_content(&page(""), "jumbo"));
        assert!(validate_content(&page(""), "JUMBO"));
        assert!(!validate_content(&page(""), "disco"));
        assert!(!validate_content("<html>jumbo</html>", "jumbo"));
        assert!(!validate_content(&format!("jumbo {}", "x".repeat(2000)), "jumbo"));
    }
}
