//! Domain module - Core entities and constant tables
//!
//! - `entities`: categories, filters, raw candidates and per-category results
//! - `constants`: site characteristics, thresholds and versioned vocabularies

pub mod constants;
pub mod entities;

// Re-export commonly used items for convenience
pub use entities::{
    CategoryEntity, CategoryResult, FilterEntity, PipelineStage, RawCandidate, StrategyTag,
    TargetType,
};
