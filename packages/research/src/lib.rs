//! Batch Web Research Library
//!
//! Takes a list of entities (companies, products, people), searches the
//! web for each one, fetches and cleans the result pages, and asks a
//! model to extract a structured analysis. One report comes out with
//! exactly one record per input entity.
//!
//! # Design
//!
//! - **Failures are data.** A dead link, an empty search, a garbled
//!   model reply: each becomes part of that entity's record instead of
//!   an error that stops the batch.
//! - **One record per entity, always.** Input order is preserved, and
//!   even a cancelled run reports every entity.
//! - **Three seams, three traits.** Search, fetching, and extraction
//!   are trait objects with production backends and mock twins, so the
//!   pipeline tests without touching the network.
//! - **Polite by default.** Entity starts are paced, throttle responses
//!   back off with escalation, and page fetches are bounded.
//!
//! # Usage
//!
//! ```rust,ignore
//! use research::extractors::GroqExtractor;
//! use research::fetchers::HttpFetcher;
//! use research::pipeline::BatchOrchestrator;
//! use research::searchers::DuckDuckGoSearcher;
//! use research::types::BatchConfig;
//!
//! let config = BatchConfig::new().with_max_search_results(5);
//! let orchestrator = BatchOrchestrator::new(
//!     DuckDuckGoSearcher::new(),
//!     HttpFetcher::new(),
//!     GroqExtractor::from_env()?,
//!     config,
//! );
//!
//! let entities = vec!["Acme Corp".to_string(), "Globex".to_string()];
//! let report = orchestrator.run(&entities).await?;
//!
//! for record in &report {
//!     println!("{}: {}", record.entity, record.status);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (SearchProvider, ContentFetcher, Extractor)
//! - [`types`] - Config, analysis, and report types
//! - [`pipeline`] - Batch orchestration, prompts, reply parsing, pacing
//! - [`searchers`] - Search provider implementations (DuckDuckGo, Tavily)
//! - [`fetchers`] - Content fetcher implementations
//! - [`extractors`] - Model extractor implementations (Groq)
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod extractors;
pub mod fetchers;
pub mod pipeline;
pub mod progress;
pub mod query;
pub mod searchers;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{BatchError, EntityError, ExtractError, SearchError};
pub use traits::{
    extractor::{Extractor, ModelResponse},
    fetcher::{ContentFetcher, FetchStatus, PageContent},
    searcher::{SearchHit, SearchProvider},
};
pub use types::{
    analysis::{EntityAnalysis, SourceConfidence},
    config::{BatchConfig, DEFAULT_TEMPLATE},
    report::{BatchReport, RecordStatus, ResearchRecord},
};

// Re-export the orchestrator and its knobs
pub use pipeline::{BatchOrchestrator, Pacer, ThrottleBackoff};

// Re-export backends
pub use extractors::GroqExtractor;
pub use fetchers::HttpFetcher;
pub use searchers::{DuckDuckGoSearcher, TavilySearcher};

// Re-export the remaining public surface
pub use progress::ProgressObserver;
pub use query::render_query;
pub use security::ApiKey;
