//! Parsing configuration for HTML extraction
//!
//! Selector fallback tables for the locator and the strategies, plus the
//! extraction rules (denylists and vocabularies) injected into every pass.

use serde::{Deserialize, Serialize};

use crate::domain::constants::{VOCABULARY_VERSION, extraction, site, vocabulary};

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Main parsing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Base URL for resolving relative links
    pub base_url: String,

    /// Container predicates per target
    pub locator: LocatorSelectors,

    /// Selectors used inside containers
    pub strategies: StrategySelectors,

    /// Denylists and vocabularies
    pub rules: ExtractionRules,
}

impl ParsingConfig {
    pub fn for_site(base_url: impl Into<String>, max_filters: usize) -> Self {
        Self {
            base_url: base_url.into(),
            rules: ExtractionRules {
                max_filters,
                ..ExtractionRules::default()
            },
            ..Self::default()
        }
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            base_url: site::BASE_URL.to_string(),
            locator: LocatorSelectors::default(),
            strategies: StrategySelectors::default(),
            rules: ExtractionRules::default(),
        }
    }
}

/// Ordered container predicates; the first predicate yielding an accepted
/// container wins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorSelectors {
    pub categories: Vec<String>,
    pub filters: Vec<String>,
}

impl Default for LocatorSelectors {
    fn default() -> Self {
        Self {
            categories: owned(&[
                "[class*=\"vtex-menu\"]",
                "[class*=\"menuContainer\"]",
                "[class*=\"menu\"]",
                "[class*=\"nav\"]",
                "[class*=\"category\"]",
                "nav",
                "[role=\"navigation\"]",
            ]),
            filters: owned(&[
                "[class*=\"accordionFilter\"]",
                ".filters",
                ".filter-sidebar",
                ".left-filters",
                ".sidebar",
                ".filter-container",
                ".facets",
                ".filter-menu",
                ".filter-list",
                "[class*=\"filter\"]",
            ]),
        }
    }
}

/// Selectors for the element-scanning strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategySelectors {
    pub category_links: String,
    pub attribute_scan: Vec<String>,
    pub list_navigation: Vec<String>,
    pub facet_title: Vec<String>,
    pub scripts: String,
}

impl Default for StrategySelectors {
    fn default() -> Self {
        Self {
            category_links: "a[href]".to_string(),
            attribute_scan: owned(&[
                "[data-filter]",
                "[data-facet]",
                "[data-filter-name]",
                "[data-facet-name]",
                "[data-testid*=\"filter\"]",
            ]),
            list_navigation: owned(&[
                "[class*=\"filter\"] li",
                "[class*=\"facet\"] li",
                "[class*=\"nav\"] li",
                ".filter-item",
                ".facet",
                ".filter-option",
                ".search-filter",
                ".filter-group",
            ]),
            facet_title: owned(&[
                "[class*=\"accordionFilterItemTitle\"]",
                "h3",
                "h4",
                "h5",
                "h6",
                "label",
                "[class*=\"title\"]",
                "[class*=\"Title\"]",
            ]),
            scripts: "script".to_string(),
        }
    }
}

/// Denylists and vocabularies applied by strategies and the normalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRules {
    pub vocabulary_version: u32,
    pub navigation_path_denylist: Vec<String>,
    pub link_text_denylist: Vec<String>,
    pub facet_keywords: Vec<String>,
    pub price_terms: Vec<String>,
    pub control_prefixes: Vec<String>,
    pub base_filter_aliases: Vec<String>,
    pub max_filters: usize,
}

impl ExtractionRules {
    pub fn is_facet_keyword(&self, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        self.facet_keywords.iter().any(|k| k.to_lowercase() == text)
    }

    pub fn is_base_filter_alias(&self, text: &str) -> bool {
        let text = text.trim().to_lowercase();
        self.base_filter_aliases.iter().any(|a| *a == text)
    }

    /// Substring match on the lowercased path
    pub fn is_navigation_path(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        path == "/p"
            || path.ends_with("/p")
            || self.navigation_path_denylist.iter().any(|d| path.contains(d.as_str()))
    }

    /// Whole-word match, so "Verduras" survives the "ver" entry
    pub fn has_denied_link_word(&self, text: &str) -> bool {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .any(|w| self.link_text_denylist.iter().any(|d| d == w))
    }

    pub fn has_price_term(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.price_terms.iter().any(|t| text.contains(t.as_str()))
    }

    /// Alphabetic prefixes need a word boundary, symbols do not
    pub fn starts_with_control(&self, text: &str) -> bool {
        let text = text.trim_start();
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            return true;
        }
        self.control_prefixes.iter().any(|prefix| {
            let Some(rest) = strip_prefix_ignore_case(text, prefix) else {
                return false;
            };
            if prefix.chars().all(char::is_alphabetic) {
                !rest.starts_with(char::is_alphanumeric)
            } else {
                true
            }
        })
    }
}

fn strip_prefix_ignore_case<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let offset = chars.next().map(|(i, _)| i).unwrap_or(text.len());
    Some(&text[offset..])
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            vocabulary_version: VOCABULARY_VERSION,
            navigation_path_denylist: owned(vocabulary::NAVIGATION_PATH_DENYLIST),
            link_text_denylist: owned(vocabulary::LINK_TEXT_DENYLIST),
            facet_keywords: owned(vocabulary::FACET_KEYWORDS),
            price_terms: owned(vocabulary::PRICE_TERM_DENYLIST),
            control_prefixes: owned(vocabulary::CONTROL_PREFIXES),
            base_filter_aliases: owned(extraction::BASE_FILTER_ALIASES),
            max_filters: extraction::MAX_FILTERS,
        }
    }
}
