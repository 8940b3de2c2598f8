//! HTML parsing infrastructure
//!
//! Locates candidate containers, runs the extraction strategies and
//! normalizes their output into categories or filters. Everything here is
//! synchronous: `scraper::Html` is parsed and dropped inside one call so it
//! never lives across an `.await`.

pub mod config;
pub mod container_locator;
pub mod context;
pub mod entity_extractor;
pub mod normalizer;
pub mod strategies;
pub mod text;

pub use config::{ExtractionRules, LocatorSelectors, ParsingConfig, StrategySelectors};
pub use container_locator::{ContainerLocator, ContainerScope, LocatedContainer};
pub use context::ParseContext;
pub use entity_extractor::{EntityExtractor, ExtractionStats};
pub use strategies::{Confidence, ExtractionStrategy};

use scraper::Html;
use std::sync::Arc;

use crate::domain::{CategoryEntity, FilterEntity, RawCandidate, TargetType};
use crate::infrastructure::scraper_error::ScraperResult;

/// Result of parsing one page for one target
#[derive(Debug, Clone)]
pub struct PageParse<T> {
    pub entities: Vec<T>,
    /// Containers the locator accepted; zero means document fallback
    pub containers: usize,
    pub raw_candidates: usize,
    pub stats: ExtractionStats,
}

impl<T> PageParse<T> {
    pub fn used_document_fallback(&self) -> bool {
        self.containers == 0
    }
}

/// Parser for category menus and filter sidebars of one site
pub struct PageParser {
    config: ParsingConfig,
    rules: Arc<ExtractionRules>,
    locator: ContainerLocator,
    category_extractor: EntityExtractor,
    filter_extractor: EntityExtractor,
}

impl PageParser {
    pub fn new(config: ParsingConfig) -> Self {
        Self {
            rules: Arc::new(config.rules.clone()),
            locator: ContainerLocator::new(config.locator.clone()),
            category_extractor: EntityExtractor::new(TargetType::Categories, &config.strategies),
            filter_extractor: EntityExtractor::new(TargetType::Filters, &config.strategies),
            config,
        }
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    fn context(&self, target: TargetType) -> ScraperResult<ParseContext> {
        ParseContext::new(&self.config.base_url, target, Arc::clone(&self.rules))
    }

    fn extract(&self, document: &Html, context: &ParseContext) -> (Vec<RawCandidate>, usize, ExtractionStats) {
        let containers = self.locator.locate(document, context);
        let located = containers.iter().filter(|c| !c.is_document()).count();
        let extractor = match context.target {
            TargetType::Categories => &self.category_extractor,
            TargetType::Filters => &self.filter_extractor,
        };
        let (candidates, stats) = extractor.extract_all(document, &containers, context);
        (candidates, located, stats)
    }

    pub fn parse_categories(&self, html: &str) -> ScraperResult<PageParse<CategoryEntity>> {
        let context = self.context(TargetType::Categories)?;
        let document = Html::parse_document(html);
        let (candidates, containers, stats) = self.extract(&document, &context);

        Ok(PageParse {
            entities: normalizer::normalize_categories(&candidates, &context),
            containers,
            raw_candidates: candidates.len(),
            stats,
        })
    }

    /// Filters of a category page, base filters first
    pub fn parse_filters(&self, html: &str) -> ScraperResult<PageParse<FilterEntity>> {
        let context = self.context(TargetType::Filters)?;
        let document = Html::parse_document(html);
        let (candidates, containers, stats) = self.extract(&document, &context);

        Ok(PageParse {
            entities: normalizer::normalize_filters(&candidates, &context),
            containers,
            raw_candidates: candidates.len(),
            stats,
        })
    }

    /// Text of the first `<title>`, if any
    pub fn page_title(html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let selector = container_locator::compile_selector("title").ok()?;
        let title = document
            .select(&selector)
            .next()
            .map(|element| text::element_text(&element))?;
        (!title.is_empty()).then_some(title)
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new(ParsingConfig::default())
    }
}
