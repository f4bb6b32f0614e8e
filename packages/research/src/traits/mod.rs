//! Core trait abstractions for the research pipeline.
//!
//! These traits define the three seams the orchestrator works against:
//! search, page fetching, and model extraction. Production backends and
//! test mocks implement the same interfaces.

pub mod extractor;
pub mod fetcher;
pub mod searcher;

pub use extractor::{Extractor, ModelResponse};
pub use fetcher::{ContentFetcher, FetchStatus, PageContent};
pub use searcher::{SearchHit, SearchProvider};
