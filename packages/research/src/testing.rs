//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the research
//! library without making real search, HTTP, or model calls. The mocks
//! are `Clone` and clones share fixture and call state, so a test can
//! hand a clone to the orchestrator and keep one for assertions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ExtractError, ExtractResult, SearchError, SearchResult};
use crate::traits::{
    extractor::{Extractor, ModelResponse},
    fetcher::{ContentFetcher, FetchStatus, PageContent},
    searcher::{SearchHit, SearchProvider},
};
use crate::types::EntityAnalysis;

/// A mock search provider for testing.
///
/// Returns predefined hits without making network requests.
#[derive(Default, Clone)]
pub struct MockSearcher {
    /// Predefined hits by query
    hits: Arc<RwLock<HashMap<String, Vec<SearchHit>>>>,

    /// Queries that report the backend as unavailable
    fail_queries: Arc<RwLock<Vec<String>>>,

    /// How many upcoming calls report throttling before succeeding
    throttle_remaining: Arc<RwLock<u32>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockSearchCall>>>,
}

/// Record of a call made to the mock searcher.
#[derive(Debug, Clone)]
pub struct MockSearchCall {
    pub query: String,
    pub max_results: usize,
}

impl MockSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add predefined hits for a query.
    pub fn with_hits(self, query: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.write().unwrap().insert(query.into(), hits);
        self
    }

    /// Add URL strings as hits for a query.
    pub fn with_urls(self, query: impl Into<String>, urls: &[&str]) -> Self {
        let hits: Vec<_> = urls.iter().filter_map(|u| SearchHit::from_url(u)).collect();
        self.with_hits(query, hits)
    }

    /// Mark a query as failing with an unavailable backend.
    pub fn fail_query(self, query: impl Into<String>) -> Self {
        self.fail_queries.write().unwrap().push(query.into());
        self
    }

    /// Report throttling for the next `count` calls, whatever the query.
    pub fn throttle_times(self, count: u32) -> Self {
        *self.throttle_remaining.write().unwrap() = count;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockSearchCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearcher {
    async fn search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        self.calls.write().unwrap().push(MockSearchCall {
            query: query.to_string(),
            max_results,
        });

        {
            let mut remaining = self.throttle_remaining.write().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SearchError::Throttled { retry_after: None });
            }
        }

        if self.fail_queries.read().unwrap().contains(&query.to_string()) {
            return Err(SearchError::Unavailable("mock search unavailable".into()));
        }

        let mut hits = self
            .hits
            .read()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default();
        hits.truncate(max_results);
        Ok(hits)
    }
}

/// A mock content fetcher for testing.
///
/// Unknown URLs come back as `HttpError` pages, mirroring the real
/// fetcher's never-fail contract.
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Predefined pages by URL
    pages: Arc<RwLock<HashMap<String, PageContent>>>,

    /// Fetched URLs, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page that fetches successfully.
    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        let url = url.into();
        self.pages
            .write()
            .unwrap()
            .insert(url.clone(), PageContent::ok(url, text));
        self
    }

    /// Add a page that fails with the given status.
    pub fn with_failure(self, url: impl Into<String>, status: FetchStatus) -> Self {
        let url = url.into();
        self.pages
            .write()
            .unwrap()
            .insert(url.clone(), PageContent::failed(url, status));
        self
    }

    /// Get all fetched URLs, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> PageContent {
        self.calls.write().unwrap().push(url.to_string());

        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| PageContent::failed(url, FetchStatus::HttpError))
    }
}

/// A mock extractor for testing.
///
/// Returns deterministic responses keyed by entity. Unknown entities
/// get a generated structured analysis.
#[derive(Default, Clone)]
pub struct MockExtractor {
    /// Predefined responses by entity
    responses: Arc<RwLock<HashMap<String, ModelResponse>>>,

    /// How many upcoming calls fail before succeeding
    fail_remaining: Arc<RwLock<u32>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockExtractCall>>>,
}

/// Record of a call made to the mock extractor.
#[derive(Debug, Clone)]
pub struct MockExtractCall {
    pub entity: String,
    pub text: String,
}

impl MockExtractor {
    /// Create a new mock extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a structured analysis for an entity.
    pub fn with_analysis(self, entity: impl Into<String>, analysis: EntityAnalysis) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(entity.into(), ModelResponse::Structured(analysis));
        self
    }

    /// Make an entity's reply unparseable, preserving the given raw text.
    pub fn with_degraded(self, entity: impl Into<String>, raw: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(entity.into(), ModelResponse::Degraded { raw: raw.into() });
        self
    }

    /// Fail the next `count` calls with an unavailable backend.
    pub fn fail_times(self, count: u32) -> Self {
        *self.fail_remaining.write().unwrap() = count;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockExtractCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, entity: &str, aggregated_text: &str) -> ExtractResult<ModelResponse> {
        self.calls.write().unwrap().push(MockExtractCall {
            entity: entity.to_string(),
            text: aggregated_text.to_string(),
        });

        {
            let mut remaining = self.fail_remaining.write().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ExtractError::Unavailable(
                    "mock extractor unavailable".into(),
                ));
            }
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(entity)
            .cloned()
            .unwrap_or_else(|| {
                ModelResponse::Structured(EntityAnalysis::new(format!("Analysis of {}", entity)))
            }))
    }
}
