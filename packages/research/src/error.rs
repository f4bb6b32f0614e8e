//! Typed errors for the research library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. The taxonomy mirrors the
//! pipeline's blast radii: per-URL trouble never surfaces here at all
//! (see `FetchStatus`), per-entity trouble is `EntityError`, and only
//! `BatchError` can stop a whole run.

use std::time::Duration;

use thiserror::Error;

/// Errors from a web search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The backend cannot be reached or returned an unusable response,
    /// after the provider's own bounded retries.
    #[error("search backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The backend is rate limiting us. Worth retrying after a backoff,
    /// unlike `Unavailable`.
    #[error("search backend throttled")]
    Throttled {
        /// Server-suggested wait, when the backend provides one.
        retry_after: Option<Duration>,
    },
}

/// Errors from the model extraction backend.
///
/// Deliberately narrow: a completed call with malformed output is not an
/// error (see `ModelResponse::Degraded`), so the only failure mode is the
/// call itself not completing.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Network failure, auth rejection, quota exhaustion, or an empty
    /// completion.
    #[error("model backend unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Terminal failure for a single entity.
///
/// Converted into a `Failed` record at the entity boundary; the `Display`
/// string becomes the record's `error_detail`. Never aborts the batch.
#[derive(Debug, Error)]
pub enum EntityError {
    /// The search phase failed.
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// The extraction phase failed, including the single retry.
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// Search succeeded but returned zero hits.
    #[error("no results")]
    NoResults,

    /// Every page fetch failed; nothing to send to the model.
    #[error("no content retrieved")]
    NoContent,

    /// Cancellation was requested before the entity finished.
    #[error("cancelled before completion")]
    Cancelled,
}

/// Batch-fatal errors, raised before any entity is attempted.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Configuration rejected by validation.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}

/// Result type alias for search operations.
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for model extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_error_details_are_stable() {
        // Downstream report consumers match on these strings.
        assert_eq!(EntityError::NoResults.to_string(), "no results");
        assert_eq!(EntityError::NoContent.to_string(), "no content retrieved");
        assert_eq!(
            EntityError::Cancelled.to_string(),
            "cancelled before completion"
        );
    }

    #[test]
    fn test_search_error_wraps_into_entity_error() {
        let err: EntityError = SearchError::Throttled { retry_after: None }.into();
        assert_eq!(err.to_string(), "search failed: search backend throttled");
    }

    #[test]
    fn test_extract_error_carries_source_detail() {
        let err: EntityError = ExtractError::Unavailable("connection reset".into()).into();
        assert_eq!(
            err.to_string(),
            "extraction failed: model backend unavailable: connection reset"
        );
    }
}
