//! Core entities of the extraction domain
//!
//! Categories are identified by their canonical URL, filters by their
//! case-insensitive cleaned name. Identity helpers live on the entities so the
//! normalizer and the tests agree on what "duplicate" means.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::constants::extraction::BASE_FILTERS;

/// What a pipeline pass is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Categories,
    Filters,
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Categories => write!(f, "categories"),
            Self::Filters => write!(f, "filters"),
        }
    }
}

/// Provenance of a candidate entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    LinkHarvest,
    KeywordText,
    AttributeScan,
    ListNavigation,
    ScriptPattern,
    ShowMoreSplit,
    FacetTitle,
    /// Supplied by configuration rather than extracted
    Seeded,
}

impl StrategyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkHarvest => "link_harvest",
            Self::KeywordText => "keyword_text",
            Self::AttributeScan => "attribute_scan",
            Self::ListNavigation => "list_navigation",
            Self::ScriptPattern => "script_pattern",
            Self::ShowMoreSplit => "show_more_split",
            Self::FacetTitle => "facet_title",
            Self::Seeded => "seeded",
        }
    }
}

impl fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unnormalized output of a single extraction strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub name: String,
    pub url: Option<String>,
    pub strategy: StrategyTag,
}

impl RawCandidate {
    pub fn named(name: impl Into<String>, strategy: StrategyTag) -> Self {
        Self {
            name: name.into(),
            url: None,
            strategy,
        }
    }

    pub fn linked(name: impl Into<String>, url: impl Into<String>, strategy: StrategyTag) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
            strategy,
        }
    }
}

/// A top-level product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntity {
    pub name: String,
    /// Canonical absolute URL, also the identity key
    pub url: String,
    pub source_strategy: StrategyTag,
}

impl CategoryEntity {
    pub fn new(name: impl Into<String>, url: impl Into<String>, source_strategy: StrategyTag) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            source_strategy,
        }
    }

    pub fn identity_key(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for CategoryEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.url)
    }
}

/// A facet name exposed on a category page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntity {
    pub name: String,
}

impl FilterEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Case-insensitive identity
    pub fn identity_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// The three facets every category carries, in output order
    pub fn base_filters() -> Vec<Self> {
        BASE_FILTERS.iter().map(|name| Self::new(*name)).collect()
    }
}

/// Per-category pipeline progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", content = "reason", rename_all = "snake_case")]
pub enum PipelineStage {
    Pending,
    Fetched,
    Located,
    Extracted,
    Normalized,
    Done,
    Failed(String),
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Fetched => write!(f, "fetched"),
            Self::Located => write!(f, "located"),
            Self::Extracted => write!(f, "extracted"),
            Self::Normalized => write!(f, "normalized"),
            Self::Done => write!(f, "done"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Filters found for one category
///
/// Built only through [`CategoryResult::completed`] or
/// [`CategoryResult::degraded`], both of which guarantee the base filters
/// come first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: CategoryEntity,
    filters: Vec<FilterEntity>,
    pub base_filter_count: usize,
    pub stage: PipelineStage,
}

impl CategoryResult {
    /// Result of a category whose page was fetched and processed.
    /// `filters` must already be base-first, as produced by the normalizer.
    pub fn completed(category: CategoryEntity, filters: Vec<FilterEntity>) -> Self {
        let filters = if starts_with_base_filters(&filters) {
            filters
        } else {
            let mut merged = FilterEntity::base_filters();
            merged.extend(filters);
            merged
        };

        Self {
            category,
            filters,
            base_filter_count: BASE_FILTERS.len(),
            stage: PipelineStage::Done,
        }
    }

    /// Result of a category whose page could not be fetched
    pub fn degraded(category: CategoryEntity, reason: impl Into<String>) -> Self {
        Self {
            category,
            filters: FilterEntity::base_filters(),
            base_filter_count: BASE_FILTERS.len(),
            stage: PipelineStage::Failed(reason.into()),
        }
    }

    pub fn filters(&self) -> &[FilterEntity] {
        &self.filters
    }

    /// Filters found on the page, excluding the base ones
    pub fn discovered_filters(&self) -> &[FilterEntity] {
        &self.filters[self.base_filter_count.min(self.filters.len())..]
    }

    pub fn filters_count(&self) -> usize {
        self.filters.len()
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.stage, PipelineStage::Failed(_))
    }
}

fn starts_with_base_filters(filters: &[FilterEntity]) -> bool {
    filters.len() >= BASE_FILTERS.len()
        && filters
            .iter()
            .zip(BASE_FILTERS.iter())
            .all(|(filter, base)| filter.name == *base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn almacen() -> CategoryEntity {
        CategoryEntity::new("Almacén", "https://www.jumbo.com.ar/almacen", StrategyTag::LinkHarvest)
    }

    #[test]
    fn test_degraded_result_carries_only_base_filters() {
        let result = CategoryResult::degraded(almacen(), "HTTP 503");
        let names: Vec<_> = result.filters().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Category", "Sub-Category", "Product Type"]);
        assert!(result.discovered_filters().is_empty());
        assert!(result.is_degraded());
    }

    #[test]
    fn test_completed_result_prepends_missing_base_filters() {
        let result = CategoryResult::completed(almacen(), vec![FilterEntity::new("Marca")]);
        assert_eq!(result.filters_count(), 4);
        assert_eq!(result.filters()[0].name, "Category");
        assert_eq!(result.discovered_filters(), &[FilterEntity::new("Marca")]);
        assert_eq!(result.stage, PipelineStage::Done);
    }

    #[test]
    fn test_completed_result_keeps_normalized_order() {
        let mut filters = FilterEntity::base_filters();
        filters.push(FilterEntity::new("Envase"));
        let result = CategoryResult::completed(almacen(), filters.clone());
        assert_eq!(result.filters(), filters.as_slice());
    }

    #[test]
    fn test_filter_identity_is_case_insensitive() {
        assert_eq!(
            FilterEntity::new("MARCA").identity_key(),
            FilterEntity::new("marca").identity_key()
        );
    }
}
