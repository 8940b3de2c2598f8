//! Data Transfer Objects for report output

use serde::{Deserialize, Serialize};

use crate::domain::CategoryResult;

/// Serialized form of one category and its filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
    pub url: String,
    pub filters: Vec<String>,
    pub filters_count: usize,
}

impl From<&CategoryResult> for CategoryRecord {
    fn from(result: &CategoryResult) -> Self {
        Self {
            name: result.category.name.clone(),
            url: result.category.url.clone(),
            filters: result.filters().iter().map(|f| f.name.clone()).collect(),
            filters_count: result.filters_count(),
        }
    }
}

/// Totals shown in the report footer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub categories: usize,
    pub degraded: usize,
    pub total_filters: usize,
    pub discovered_filters: usize,
}

impl RunSummary {
    pub fn from_results(results: &[CategoryResult]) -> Self {
        Self {
            categories: results.len(),
            degraded: results.iter().filter(|r| r.is_degraded()).count(),
            total_filters: results.iter().map(CategoryResult::filters_count).sum(),
            discovered_filters: results.iter().map(|r| r.discovered_filters().len()).sum(),
        }
    }

    pub fn average_filters(&self) -> f64 {
        if self.categories == 0 {
            0.0
        } else {
            self.total_filters as f64 / self.categories as f64
        }
    }
}
