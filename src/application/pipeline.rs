//! Pipeline orchestrator
//!
//! Sequences fetch, locate, extract and normalize for every category, one at
//! a time, with a politeness delay between fetches. A category that cannot be
//! fetched still yields a result carrying the base filters.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{CategoryEntity, CategoryResult, FilterEntity, PipelineStage, StrategyTag, TargetType};
use crate::infrastructure::config::{AppConfig, CategorySeed};
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig, PageTransport};
use crate::infrastructure::parsing::{PageParser, ParseContext, ParsingConfig};
use crate::infrastructure::scraper_error::{ScraperError, ScraperResult};

/// Orchestrator settings taken from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub site_url: String,
    pub delay_between_requests: Duration,
    pub seeds: Vec<CategorySeed>,
}

impl PipelineSettings {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            site_url: config.site_url.clone(),
            delay_between_requests: config.delay_between_requests(),
            seeds: config.categories.clone(),
        }
    }
}

pub struct FilterPipeline {
    client: HttpClient,
    parser: PageParser,
    settings: PipelineSettings,
    cancel: CancellationToken,
}

impl FilterPipeline {
    pub fn new(client: HttpClient, parser: PageParser, settings: PipelineSettings, cancel: CancellationToken) -> Self {
        Self {
            client,
            parser,
            settings,
            cancel,
        }
    }

    /// Pipeline over a real HTTP session
    pub fn from_config(config: &AppConfig, cancel: CancellationToken) -> ScraperResult<Self> {
        let client = HttpClient::with_config(HttpClientConfig::from_app_config(config))?;
        Ok(Self::new(client, parser_for(config), PipelineSettings::from_app_config(config), cancel))
    }

    /// Pipeline over an arbitrary transport
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn PageTransport>, cancel: CancellationToken) -> Self {
        let client = HttpClient::with_transport(HttpClientConfig::from_app_config(config), transport);
        Self::new(client, parser_for(config), PipelineSettings::from_app_config(config), cancel)
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Fetch the site root and extract the category list
    pub async fn discover_categories(&self) -> ScraperResult<Vec<CategoryEntity>> {
        info!("🔍 Discovering categories from {}", self.settings.site_url);
        let content = self.client.fetch(&self.settings.site_url).await.into_result()?;

        let parsed = self.parser.parse_categories(&content)?;
        if parsed.used_document_fallback() {
            debug!("No menu container found on the site root, harvested links document-wide");
        }
        if parsed.entities.is_empty() {
            return Err(ScraperError::ExtractionEmpty {
                url: self.settings.site_url.clone(),
                target: TargetType::Categories.to_string(),
            });
        }

        info!(
            "✅ Discovered {} categories ({} raw candidates)",
            parsed.entities.len(),
            parsed.raw_candidates
        );
        Ok(parsed.entities)
    }

    /// Categories from the configured static list, in configured order
    pub fn seeded_categories(&self) -> ScraperResult<Vec<CategoryEntity>> {
        let context = ParseContext::new(
            &self.settings.site_url,
            TargetType::Categories,
            Arc::new(self.parser.config().rules.clone()),
        )?;

        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(self.settings.seeds.len());
        for seed in &self.settings.seeds {
            let url = context.canonical_url(&seed.path)?.to_string();
            if seen.insert(url.clone()) {
                categories.push(CategoryEntity::new(seed.name.trim(), url, StrategyTag::Seeded));
            }
        }
        Ok(categories)
    }

    /// Seeded categories when configured, discovered ones otherwise.
    /// Discovery fetches the site root, so the politeness delay follows it.
    pub async fn categories(&self) -> ScraperResult<Vec<CategoryEntity>> {
        if self.settings.seeds.is_empty() {
            let categories = self.discover_categories().await?;
            if self.politeness_delay().await {
                warn!("🛑 Cancelled during politeness delay after discovery");
            }
            Ok(categories)
        } else {
            let categories = self.seeded_categories()?;
            info!("📋 Using {} configured categories", categories.len());
            Ok(categories)
        }
    }

    /// Process every category in order. Stops early on cancellation and
    /// returns what was gathered so far.
    pub async fn run(&self, categories: &[CategoryEntity]) -> Vec<CategoryResult> {
        let total = categories.len();
        let mut results = Vec::with_capacity(total);
        info!("🚀 Extracting filters for {} categories", total);

        for (index, category) in categories.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("🛑 Cancelled before {} ({} of {} done)", category.name, results.len(), total);
                break;
            }

            info!("📂 [{}/{}] {}", index + 1, total, category.name);
            results.push(self.process_category(category).await);

            if index + 1 < total && self.politeness_delay().await {
                warn!("🛑 Cancelled during politeness delay ({} of {} done)", results.len(), total);
                break;
            }
        }

        let degraded = results.iter().filter(|r| r.is_degraded()).count();
        info!(
            "🏁 Finished {} of {} categories ({} degraded)",
            results.len(),
            total,
            degraded
        );
        results
    }

    /// Returns true when woken by cancellation
    async fn politeness_delay(&self) -> bool {
        let delay = self.settings.delay_between_requests;
        if delay.is_zero() {
            return self.cancel.is_cancelled();
        }
        debug!("⏳ Waiting {:?} before the next category", delay);
        tokio::select! {
            _ = self.cancel.cancelled() => true,
            _ = sleep(delay) => false,
        }
    }

    /// Run one category through the stage machine
    pub async fn process_category(&self, category: &CategoryEntity) -> CategoryResult {
        debug!("{}: {}", category.name, PipelineStage::Pending);

        let fetched = self.client.fetch(&category.url).await;
        let content = match fetched.into_result() {
            Ok(content) => content,
            Err(e) => {
                error!("❌ {} failed after fetch attempts: {}", category.name, e);
                return CategoryResult::degraded(category.clone(), e.reason());
            }
        };
        debug!("{}: {} ({} chars)", category.name, PipelineStage::Fetched, content.chars().count());

        let parsed = match self.parser.parse_filters(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("❌ {} could not be parsed: {}", category.name, e);
                return CategoryResult::degraded(category.clone(), e.reason());
            }
        };
        debug!(
            "{}: {} ({} container(s){})",
            category.name,
            PipelineStage::Located,
            parsed.containers,
            if parsed.used_document_fallback() { ", document fallback" } else { "" }
        );
        debug!("{}: {} ({} raw candidates)", category.name, PipelineStage::Extracted, parsed.raw_candidates);
        debug!("{}: {}", category.name, PipelineStage::Normalized);

        let result = CategoryResult::completed(category.clone(), parsed.entities);
        if result.discovered_filters().is_empty() {
            let empty = ScraperError::ExtractionEmpty {
                url: category.url.clone(),
                target: TargetType::Filters.to_string(),
            };
            info!("ℹ️ {}, keeping base filters only", empty);
        } else {
            info!(
                "✅ {}: {} filters ({} discovered)",
                category.name,
                result.filters_count(),
                result.discovered_filters().len()
            );
        }
        result
    }

    /// Filter extraction over already-rendered HTML, without any fetch
    pub fn extract_filters_from_html(&self, html: &str) -> ScraperResult<Vec<FilterEntity>> {
        Ok(self.parser.parse_filters(html)?.entities)
    }
}

fn parser_for(config: &AppConfig) -> PageParser {
    PageParser::new(ParsingConfig::for_site(config.site_url.clone(), config.max_filters))
}
