//! Entity extractor
//!
//! Runs the registered strategies of a target over the located containers.
//! A failing strategy is logged and contributes nothing.

use scraper::Html;
use tracing::{debug, warn};

use super::config::StrategySelectors;
use super::container_locator::LocatedContainer;
use super::context::ParseContext;
use super::strategies::{Confidence, ExtractionStrategy, strategies_for};
use super::text::{char_len, collapse_whitespace, is_purely_numeric, looks_like_price_or_unit};
use crate::domain::constants::extraction;
use crate::domain::{RawCandidate, StrategyTag, TargetType};

/// Candidate counts per strategy for one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub per_strategy: Vec<(StrategyTag, usize)>,
    pub failed_strategies: usize,
    pub supplementary_dropped: usize,
}

pub struct EntityExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl EntityExtractor {
    pub fn new(target: TargetType, selectors: &StrategySelectors) -> Self {
        Self {
            strategies: strategies_for(target, selectors),
        }
    }

    /// Extractor over an explicit strategy list
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract from a single container; document-wide strategies run against it too
    pub fn extract(&self, container: &LocatedContainer<'_>, context: &ParseContext) -> Vec<RawCandidate> {
        self.extract_all(container.document, std::slice::from_ref(container), context).0
    }

    /// Extract from every located container of a page
    pub fn extract_all(
        &self,
        document: &Html,
        containers: &[LocatedContainer<'_>],
        context: &ParseContext,
    ) -> (Vec<RawCandidate>, ExtractionStats) {
        let mut stats = ExtractionStats::default();
        let mut primary = Vec::new();
        let mut supplementary = Vec::new();
        let page = LocatedContainer::whole_document(document);

        for strategy in &self.strategies {
            let targets: &[LocatedContainer<'_>] = if strategy.document_wide() {
                std::slice::from_ref(&page)
            } else {
                containers
            };

            let mut produced = Vec::new();
            for container in targets {
                match strategy.extract(container, context) {
                    Ok(candidates) => produced.extend(
                        candidates
                            .into_iter()
                            .filter(|candidate| accept_candidate(candidate, context)),
                    ),
                    Err(e) => {
                        warn!("⚠️ Strategy {} failed, contributing no candidates: {}", strategy.tag(), e);
                        stats.failed_strategies += 1;
                    }
                }
            }

            debug!("🔎 {} produced {} {} candidate(s)", strategy.tag(), produced.len(), context.target);
            stats.per_strategy.push((strategy.tag(), produced.len()));
            match strategy.confidence() {
                Confidence::Primary => primary.extend(produced),
                Confidence::Supplementary => supplementary.push(produced),
            }
        }

        if primary.is_empty() {
            stats.supplementary_dropped = supplementary.iter().map(Vec::len).sum();
            if stats.supplementary_dropped > 0 {
                debug!(
                    "Dropping {} supplementary candidate(s): no primary strategy produced any",
                    stats.supplementary_dropped
                );
            }
        } else {
            primary.extend(supplementary.into_iter().flatten());
        }

        (primary, stats)
    }
}

/// Candidate-level bounds and denylists, independent of the strategy
pub fn accept_candidate(candidate: &RawCandidate, context: &ParseContext) -> bool {
    let name = collapse_whitespace(&candidate.name);
    let (min, max) = match context.target {
        TargetType::Categories => (extraction::CATEGORY_NAME_MIN_CHARS, extraction::CATEGORY_NAME_MAX_CHARS),
        TargetType::Filters => (extraction::FILTER_NAME_MIN_CHARS, extraction::FILTER_NAME_MAX_CHARS),
    };
    let length = char_len(&name);
    if length < min || length > max {
        return false;
    }

    if is_purely_numeric(&name) || looks_like_price_or_unit(&name) || context.rules.has_price_term(&name) {
        return false;
    }

    match context.target {
        TargetType::Categories => candidate.url.is_some(),
        TargetType::Filters => !context.rules.is_base_filter_alias(&name),
    }
}
