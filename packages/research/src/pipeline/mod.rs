//! The research pipeline.
//!
//! `BatchOrchestrator` is the entry point; the rest of the module holds
//! its moving parts: prompt construction, reply parsing, pacing, and
//! throttle backoff.

pub mod batch;
pub mod pacing;
pub mod prompts;
pub mod response;

pub use batch::BatchOrchestrator;
pub use pacing::{Pacer, ThrottleBackoff};
pub use prompts::{build_extraction_prompt, EXTRACTION_PROMPT, EXTRACTION_SYSTEM};
pub use response::parse_analysis;
