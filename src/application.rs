//! Application layer module
//!
//! Orchestrates the infrastructure into runs: the filter pipeline, site
//! probes and report output.

pub mod dto;
pub mod pipeline;
pub mod report;
pub mod site_probe;

pub use dto::{CategoryRecord, RunSummary};
pub use pipeline::{FilterPipeline, PipelineSettings};
pub use site_probe::{SiteInfo, SiteProbe, SiteStatus, validate_content};
