//! Data types for the research pipeline.

pub mod analysis;
pub mod config;
pub mod report;

pub use analysis::{EntityAnalysis, SourceConfidence};
pub use config::{BatchConfig, DEFAULT_TEMPLATE};
pub use report::{BatchReport, RecordStatus, ResearchRecord};
