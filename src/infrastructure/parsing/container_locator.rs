//! Candidate locator
//!
//! Applies the ordered container predicates of a target and returns the
//! subtrees that pass the substance heuristic. Never returns an empty list:
//! the document root is the fallback container.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::config::LocatorSelectors;
use super::context::ParseContext;
use super::strategies::qualify_category_link;
use super::text::char_len;
use crate::domain::TargetType;
use crate::domain::constants::extraction;
use crate::infrastructure::scraper_error::{ScraperError, ScraperResult};

/// Whether a container came from a predicate or is the whole document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerScope {
    Container,
    Document,
}

/// A subtree likely to hold entities of interest
#[derive(Debug, Clone, Copy)]
pub struct LocatedContainer<'a> {
    pub document: &'a Html,
    pub element: ElementRef<'a>,
    pub scope: ContainerScope,
}

impl<'a> LocatedContainer<'a> {
    pub fn whole_document(document: &'a Html) -> Self {
        Self {
            document,
            element: document.root_element(),
            scope: ContainerScope::Document,
        }
    }

    pub fn is_document(&self) -> bool {
        self.scope == ContainerScope::Document
    }
}

pub(crate) fn compile_selector(selector: &str) -> ScraperResult<Selector> {
    Selector::parse(selector).map_err(|e| ScraperError::invalid_selector(selector, format!("{e:?}")))
}

/// Container locator over the configured predicate tables
#[derive(Debug, Clone, Default)]
pub struct ContainerLocator {
    selectors: LocatorSelectors,
}

impl ContainerLocator {
    pub fn new(selectors: LocatorSelectors) -> Self {
        Self { selectors }
    }

    fn predicates(&self, target: TargetType) -> &[String] {
        match target {
            TargetType::Categories => &self.selectors.categories,
            TargetType::Filters => &self.selectors.filters,
        }
    }

    /// Locate containers for `context.target`, falling back to the whole document
    pub fn locate<'a>(&self, document: &'a Html, context: &ParseContext) -> Vec<LocatedContainer<'a>> {
        for predicate in self.predicates(context.target) {
            let selector = match compile_selector(predicate) {
                Ok(selector) => selector,
                Err(e) => {
                    warn!("⚠️ Skipping container predicate: {}", e);
                    continue;
                }
            };

            let accepted: Vec<ElementRef<'a>> = document
                .select(&selector)
                .filter(|element| has_substance(element, context))
                .collect();
            if accepted.is_empty() {
                continue;
            }

            let containers = collapse_nested(accepted);
            debug!(
                "📦 Predicate '{}' located {} {} container(s)",
                predicate,
                containers.len(),
                context.target
            );
            return containers
                .into_iter()
                .map(|element| LocatedContainer {
                    document,
                    element,
                    scope: ContainerScope::Container,
                })
                .collect();
        }

        debug!("No {} container located, falling back to the whole document", context.target);
        vec![LocatedContainer::whole_document(document)]
    }
}

/// Decorative and empty containers are rejected
fn has_substance(element: &ElementRef<'_>, context: &ParseContext) -> bool {
    match context.target {
        TargetType::Categories => {
            let Ok(links) = Selector::parse("a[href]") else {
                return false;
            };
            element
                .select(&links)
                .filter(|link| qualify_category_link(link, context, ContainerScope::Container).is_some())
                .take(extraction::MIN_CONTAINER_LINKS)
                .count()
                >= extraction::MIN_CONTAINER_LINKS
        }
        TargetType::Filters => {
            let text: String = element.text().collect();
            char_len(&text.split_whitespace().collect::<String>()) >= extraction::MIN_CONTAINER_TEXT_CHARS
        }
    }
}

/// Keep only candidates not nested inside another accepted candidate
fn collapse_nested(accepted: Vec<ElementRef<'_>>) -> Vec<ElementRef<'_>> {
    let ids: HashSet<_> = accepted.iter().map(|element| element.id()).collect();
    accepted
        .into_iter()
        .filter(|element| !element.ancestors().any(|ancestor| ids.contains(&ancestor.id())))
        .collect()
}
