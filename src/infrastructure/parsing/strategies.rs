//! Extraction strategies
//!
//! Each strategy scans a located container independently and tags its output.
//! Strategies only produce raw candidates; bounds, denylists and
//! deduplication are applied afterwards by the extractor and the normalizer.

use scraper::{ElementRef, Selector};
use url::Url;

use super::config::StrategySelectors;
use super::container_locator::{ContainerScope, LocatedContainer, compile_selector};
use super::context::ParseContext;
use super::text::{CATEGORY_PATH, SCRIPT_NAME_FIELD, SHOW_MORE, char_len, element_text, word_count};
use crate::domain::constants::extraction;
use crate::domain::{RawCandidate, StrategyTag, TargetType};
use crate::infrastructure::scraper_error::ScraperResult;

/// How much a strategy's output is trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    Primary,
    /// Kept only when a primary strategy also produced candidates
    Supplementary,
}

pub trait ExtractionStrategy: Send + Sync {
    fn tag(&self) -> StrategyTag;

    fn confidence(&self) -> Confidence {
        Confidence::Primary
    }

    /// Run once per page against the whole document instead of per container
    fn document_wide(&self) -> bool {
        false
    }

    fn extract(&self, container: &LocatedContainer<'_>, context: &ParseContext) -> ScraperResult<Vec<RawCandidate>>;
}

/// Registered strategies for a target, in execution order
pub fn strategies_for(target: TargetType, selectors: &StrategySelectors) -> Vec<Box<dyn ExtractionStrategy>> {
    match target {
        TargetType::Categories => vec![Box::new(LinkHarvestStrategy {
            selector: selectors.category_links.clone(),
        })],
        TargetType::Filters => vec![
            Box::new(KeywordTextStrategy),
            Box::new(AttributeScanStrategy {
                selectors: selectors.attribute_scan.clone(),
            }),
            Box::new(ListNavigationStrategy {
                selectors: selectors.list_navigation.clone(),
            }),
            Box::new(ScriptPatternStrategy {
                selector: selectors.scripts.clone(),
            }),
            Box::new(ShowMoreSplitStrategy),
            Box::new(FacetTitleStrategy {
                selectors: selectors.facet_title.clone(),
            }),
        ],
    }
}

fn compile_group(selectors: &[String]) -> ScraperResult<Selector> {
    compile_selector(&selectors.join(", "))
}

/// Check a single anchor against the category link rules
pub(crate) fn qualify_category_link(
    link: &ElementRef<'_>,
    context: &ParseContext,
    scope: ContainerScope,
) -> Option<RawCandidate> {
    let href = link.value().attr("href")?.trim();

    let path = if href.starts_with('/') && !href.starts_with("//") {
        if !CATEGORY_PATH.is_match(href) {
            return None;
        }
        href.split(['?', '#']).next().unwrap_or(href).to_string()
    } else {
        let url = Url::parse(href).ok()?;
        if !context.is_same_site(&url) || !CATEGORY_PATH.is_match(url.path()) {
            return None;
        }
        url.path().to_string()
    };

    if context.rules.is_navigation_path(&path) {
        return None;
    }

    let name = element_text(link);
    let length = char_len(&name);
    if !(extraction::CATEGORY_NAME_MIN_CHARS..=extraction::CATEGORY_NAME_MAX_CHARS).contains(&length) {
        return None;
    }
    if scope == ContainerScope::Document && context.rules.has_denied_link_word(&name) {
        return None;
    }

    let url = context.canonical_url(href).ok()?;
    Some(RawCandidate::linked(name, url.to_string(), StrategyTag::LinkHarvest))
}

/// Same-site category anchors
pub struct LinkHarvestStrategy {
    selector: String,
}

impl ExtractionStrategy for LinkHarvestStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::LinkHarvest
    }

    fn extract(&self, container: &LocatedContainer<'_>, context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        let selector = compile_selector(&self.selector)?;
        Ok(container
            .element
            .select(&selector)
            .filter_map(|link| qualify_category_link(&link, context, container.scope))
            .collect())
    }
}

/// Text nodes equal to a known facet name
pub struct KeywordTextStrategy;

impl ExtractionStrategy for KeywordTextStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::KeywordText
    }

    fn extract(&self, container: &LocatedContainer<'_>, context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        Ok(container
            .element
            .descendants()
            .filter_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
            .filter(|text| context.rules.is_facet_keyword(text))
            .map(|text| RawCandidate::named(text, self.tag()))
            .collect())
    }
}

/// Elements marked with filter data attributes
pub struct AttributeScanStrategy {
    selectors: Vec<String>,
}

impl ExtractionStrategy for AttributeScanStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::AttributeScan
    }

    fn extract(&self, container: &LocatedContainer<'_>, _context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        let selector = compile_group(&self.selectors)?;
        Ok(container
            .element
            .select(&selector)
            .filter_map(|element| {
                let named = ["data-filter-name", "data-facet-name"]
                    .iter()
                    .filter_map(|attr| element.value().attr(attr))
                    .map(str::trim)
                    .find(|value| !value.is_empty())
                    .map(str::to_string);
                let name = named.unwrap_or_else(|| element_text(&element));
                (!name.is_empty()).then(|| RawCandidate::named(name, self.tag()))
            })
            .collect())
    }
}

/// List items under filter/nav/facet lists
pub struct ListNavigationStrategy {
    selectors: Vec<String>,
}

impl ExtractionStrategy for ListNavigationStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::ListNavigation
    }

    fn extract(&self, container: &LocatedContainer<'_>, context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        let selector = compile_group(&self.selectors)?;
        // Outside a filter container, list items are mostly site navigation
        let document_wide = container.is_document();
        Ok(container
            .element
            .select(&selector)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty() && word_count(text) <= extraction::FILTER_NAME_MAX_WORDS)
            .filter(|text| !document_wide || context.rules.is_facet_keyword(text))
            .map(|text| RawCandidate::named(text, self.tag()))
            .collect())
    }
}

/// Quoted name fields inside inline scripts that mention filters or facets
pub struct ScriptPatternStrategy {
    selector: String,
}

impl ExtractionStrategy for ScriptPatternStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::ScriptPattern
    }

    fn confidence(&self) -> Confidence {
        Confidence::Supplementary
    }

    fn document_wide(&self) -> bool {
        true
    }

    fn extract(&self, container: &LocatedContainer<'_>, _context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        let selector = compile_selector(&self.selector)?;
        let mut candidates = Vec::new();

        for script in container.document.select(&selector) {
            let body: String = script.text().collect();
            let lowered = body.to_lowercase();
            if !(lowered.contains("filter") || lowered.contains("facet")) {
                continue;
            }
            candidates.extend(
                SCRIPT_NAME_FIELD
                    .captures_iter(&body)
                    .map(|caps| RawCandidate::named(caps[1].trim(), self.tag())),
            );
        }

        Ok(candidates)
    }
}

/// Facet name sitting before a "Mostrar N más" toggle
pub struct ShowMoreSplitStrategy;

impl ShowMoreSplitStrategy {
    /// Text before the toggle in the nearest ancestor that has any
    fn leading_text(toggle: ElementRef<'_>) -> Option<String> {
        let mut current = Some(toggle);
        for _ in 0..2 {
            let element = current?;
            let text = element_text(&element);
            if let Some(found) = SHOW_MORE.find(&text) {
                let before = text[..found.start()].trim();
                if !before.is_empty() {
                    return (word_count(before) <= extraction::FILTER_NAME_MAX_WORDS).then(|| before.to_string());
                }
            }
            current = element.parent().and_then(ElementRef::wrap);
        }
        None
    }
}

impl ExtractionStrategy for ShowMoreSplitStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::ShowMoreSplit
    }

    fn extract(&self, container: &LocatedContainer<'_>, _context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        Ok(container
            .element
            .descendants()
            .filter(|node| node.value().as_text().is_some_and(|text| SHOW_MORE.is_match(text)))
            .filter_map(|node| node.parent().and_then(ElementRef::wrap))
            .filter_map(Self::leading_text)
            .map(|name| RawCandidate::named(name, self.tag()))
            .collect())
    }
}

/// Headings and title-classed elements inside a located filter container
pub struct FacetTitleStrategy {
    selectors: Vec<String>,
}

impl ExtractionStrategy for FacetTitleStrategy {
    fn tag(&self) -> StrategyTag {
        StrategyTag::FacetTitle
    }

    fn extract(&self, container: &LocatedContainer<'_>, context: &ParseContext) -> ScraperResult<Vec<RawCandidate>> {
        if container.is_document() {
            return Ok(Vec::new());
        }

        let selector = compile_group(&self.selectors)?;
        Ok(container
            .element
            .select(&selector)
            .map(|element| element_text(&element))
            .filter(|text| !text.is_empty() && !context.rules.starts_with_control(text))
            .map(|text| RawCandidate::named(text, self.tag()))
            .collect())
    }
}
