//! jumbo-facets - category and filter extraction for the Jumbo Argentina store
//!
//! Fetches category pages with a retrying HTTP client and turns their noisy
//! markup into clean, deduplicated category and filter lists through a set of
//! independent extraction strategies.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{FilterPipeline, SiteProbe};
pub use domain::{CategoryEntity, CategoryResult, FilterEntity};
pub use infrastructure::{AppConfig, ConfigManager, ScraperError, ScraperResult};
