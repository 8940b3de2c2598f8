//! Normalizer and deduplicator
//!
//! Turns raw candidates from every strategy into the final entity list.
//! Deterministic: the same candidates always give the same list, and feeding
//! a normalized filter list back in returns it unchanged.

use std::collections::HashSet;
use tracing::debug;

use super::context::ParseContext;
use super::text::{char_len, clean_text};
use crate::domain::constants::extraction;
use crate::domain::{CategoryEntity, FilterEntity, RawCandidate};

fn within(text: &str, min: usize, max: usize) -> bool {
    let length = char_len(text);
    !text.is_empty() && length >= min && length <= max
}

/// Categories in first-discovery order, unique by canonical URL
pub fn normalize_categories(candidates: &[RawCandidate], context: &ParseContext) -> Vec<CategoryEntity> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();

    for candidate in candidates {
        let Some(href) = candidate.url.as_deref() else {
            continue;
        };
        let name = clean_text(&candidate.name);
        if !within(&name, extraction::CATEGORY_NAME_MIN_CHARS, extraction::CATEGORY_NAME_MAX_CHARS) {
            continue;
        }
        let Ok(url) = context.canonical_url(href) else {
            debug!("Dropping category '{}' with unresolvable URL '{}'", name, href);
            continue;
        };

        let category = CategoryEntity::new(name, url.to_string(), candidate.strategy);
        if seen.insert(category.identity_key().to_string()) {
            categories.push(category);
        }
    }

    categories
}

/// Base filters first, then unique discovered names sorted case-insensitively,
/// capped at `max_filters` in total
pub fn normalize_filters(candidates: &[RawCandidate], context: &ParseContext) -> Vec<FilterEntity> {
    let mut seen = HashSet::new();
    let mut discovered = Vec::new();

    for candidate in candidates {
        let name = clean_text(&candidate.name);
        if !within(&name, extraction::FILTER_NAME_MIN_CHARS, extraction::FILTER_NAME_MAX_CHARS)
            || context.rules.is_base_filter_alias(&name)
        {
            continue;
        }

        let filter = FilterEntity::new(name);
        if seen.insert(filter.identity_key()) {
            discovered.push(filter);
        }
    }

    discovered.sort_by(|a, b| {
        a.identity_key()
            .cmp(&b.identity_key())
            .then_with(|| a.name.cmp(&b.name))
    });

    let room = context.rules.max_filters.saturating_sub(extraction::BASE_FILTERS.len());
    if discovered.len() > room {
        debug!("Capping {} discovered filters to {}", discovered.len(), room);
        discovered.truncate(room);
    }

    let mut filters = FilterEntity::base_filters();
    filters.extend(discovered);
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StrategyTag, TargetType};
    use crate::infrastructure::parsing::config::ExtractionRules;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn context(target: TargetType) -> ParseContext {
        ParseContext::new("https://www.jumbo.com.ar", target, Arc::new(ExtractionRules::default())).unwrap()
    }

    fn named(names: &[&str]) -> Vec<RawCandidate> {
        names
            .iter()
            .map(|n| RawCandidate::named(*n, StrategyTag::KeywordText))
            .collect()
    }

    fn filter_names(filters: &[FilterEntity]) -> Vec<&str> {
        filters.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_first_seen_category_name_wins() {
        let candidates = vec![
            RawCandidate::linked("Almacén", "/almacen", StrategyTag::LinkHarvest),
            RawCandidate::linked("Almacen y Despensa", "https://www.jumbo.com.ar/almacen/", StrategyTag::LinkHarvest),
            RawCandidate::linked("Bebidas", "/bebidas", StrategyTag::LinkHarvest),
        ];
        let categories = normalize_categories(&candidates, &context(TargetType::Categories));

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Almacén");
        assert_eq!(categories[0].url, "https://www.jumbo.com.ar/almacen");
        assert_eq!(categories[1].name, "Bebidas");
    }

    #[test]
    fn test_filters_are_base_first_then_sorted() {
        let filters = normalize_filters(&named(&["sabor", "Marca", "envase", "MARCA", "Categoría"]), &context(TargetType::Filters));
        assert_eq!(
            filter_names(&filters),
            vec!["Category", "Sub-Category", "Product Type", "envase", "Marca", "sabor"]
        );
    }

    #[test]
    fn test_filters_are_capped_including_base() {
        let rules = ExtractionRules {
            max_filters: 5,
            ..ExtractionRules::default()
        };
        let ctx = ParseContext::new("https://www.jumbo.com.ar", TargetType::Filters, Arc::new(rules)).unwrap();
        let filters = normalize_filters(&named(&["Tipo", "Sabor", "Marca", "Envase"]), &ctx);
        assert_eq!(
            filter_names(&filters),
            vec!["Category", "Sub-Category", "Product Type", "Envase", "Marca"]
        );
    }

    #[test]
    fn test_empty_after_cleaning_is_rejected() {
        let filters = normalize_filters(&named(&["¡¡!!", " - ", "Sabor"]), &context(TargetType::Filters));
        assert_eq!(filter_names(&filters)[3..], ["Sabor"]);
        assert_eq!(filters.len(), 4);
    }

    proptest! {
        #[test]
        fn prop_normalizing_twice_is_stable(names in prop::collection::vec("[A-Za-zñáé -]{0,20}", 0..40)) {
            let ctx = context(TargetType::Filters);
            let raw: Vec<RawCandidate> = names.iter().map(|n| RawCandidate::named(n.clone(), StrategyTag::ListNavigation)).collect();

            let first = normalize_filters(&raw, &ctx);
            prop_assert_eq!(&first, &normalize_filters(&raw, &ctx));

            let again: Vec<RawCandidate> = first.iter().map(|f| RawCandidate::named(f.name.clone(), StrategyTag::ListNavigation)).collect();
            prop_assert_eq!(&first, &normalize_filters(&again, &ctx));
        }

        #[test]
        fn prop_no_duplicate_identity_keys(names in prop::collection::vec("[A-Za-z ]{0,12}", 0..60)) {
            let ctx = context(TargetType::Filters);
            let raw: Vec<RawCandidate> = names.iter().map(|n| RawCandidate::named(n.clone(), StrategyTag::KeywordText)).collect();
            let filters = normalize_filters(&raw, &ctx);

            let keys: HashSet<_> = filters.iter().map(FilterEntity::identity_key).collect();
            prop_assert_eq!(keys.len(), filters.len());
            prop_assert!(filters.len() <= extraction::MAX_FILTERS);
            prop_assert_eq!(filter_names(&filters[..3]), vec!["Category", "Sub-Category", "Product Type"]);
        }
    }
}
