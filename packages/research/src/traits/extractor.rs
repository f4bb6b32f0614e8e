//! Model extraction trait.
//!
//! The extractor turns aggregated page text into a structured analysis.
//! Model output that completes but cannot be parsed is NOT an error: the
//! raw reply comes back as `ModelResponse::Degraded` and the pipeline
//! downgrades the record to partial instead of discarding paid-for
//! output. Only a call that fails to complete is an `ExtractError`.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::EntityAnalysis;

/// Outcome of a completed extraction call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// The reply parsed into a structured analysis.
    Structured(EntityAnalysis),

    /// The reply completed but could not be parsed, even after salvage.
    /// The raw text is preserved for the record.
    Degraded { raw: String },
}

/// Model extraction backend.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract a structured analysis of `entity` from aggregated page
    /// text.
    async fn extract(&self, entity: &str, aggregated_text: &str) -> ExtractResult<ModelResponse>;
}
