//! Parsing context for extraction passes
//!
//! Holds what every strategy needs to judge a candidate: the site root used to
//! resolve relative links, the target of the pass and the extraction rules.

use std::sync::Arc;
use url::Url;

use super::config::ExtractionRules;
use crate::domain::TargetType;
use crate::infrastructure::scraper_error::{ScraperError, ScraperResult};

/// Context information for one extraction pass
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Site root for resolving relative links
    pub base_url: Url,

    /// What the pass is looking for
    pub target: TargetType,

    pub rules: Arc<ExtractionRules>,
}

impl ParseContext {
    pub fn new(base_url: &str, target: TargetType, rules: Arc<ExtractionRules>) -> ScraperResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| ScraperError::UrlResolution {
            href: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            base_url,
            target,
            rules,
        })
    }

    /// Same context aimed at another target
    pub fn retarget(&self, target: TargetType) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }

    /// Host without a leading `www.`
    fn site_host(&self) -> &str {
        let host = self.base_url.host_str().unwrap_or_default();
        host.strip_prefix("www.").unwrap_or(host)
    }

    /// Whether an absolute URL points at the configured site
    pub fn is_same_site(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or_default();
        let host = host.strip_prefix("www.").unwrap_or(host);
        !host.is_empty() && host.eq_ignore_ascii_case(self.site_host())
    }

    /// Resolve `href` against the site root into its canonical form:
    /// no query, no fragment, no trailing slash except on the root
    pub fn canonical_url(&self, href: &str) -> ScraperResult<Url> {
        let mut url = self
            .base_url
            .join(href.trim())
            .map_err(|e| ScraperError::UrlResolution {
                href: href.to_string(),
                reason: e.to_string(),
            })?;
        url.set_query(None);
        url.set_fragment(None);

        let path = url.path().to_string();
        if path.len() > 1 && path.ends_with('/') {
            url.set_path(path.trim_end_matches('/'));
        }
        Ok(url)
    }
}
