//! Search provider trait for entity discovery.
//!
//! Each entity's rendered query goes to a search provider, which returns
//! a bounded list of candidate pages. The trait abstracts over providers
//! (DuckDuckGo HTML scraping, Tavily API, mocks) so the pipeline never
//! knows which backend is wired in.

use async_trait::async_trait;
use url::Url;

use crate::error::SearchResult;

/// One result returned by a search provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// The result URL.
    pub url: Url,

    /// Result title. Empty when the provider did not supply one.
    pub title: String,

    /// Result snippet. Empty when the provider did not supply one.
    pub snippet: String,
}

impl SearchHit {
    /// Create a hit from a URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            title: String::new(),
            snippet: String::new(),
        }
    }

    /// Create from a URL string, rejecting unparseable URLs.
    pub fn from_url(url: &str) -> Option<Self> {
        Url::parse(url).ok().map(Self::new)
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a snippet.
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }
}

/// Web search backend.
///
/// Implementations own their transport concerns: they time out their own
/// HTTP calls and retry transient transport failures a bounded number of
/// times. Two failure modes matter to the caller and must be kept
/// distinct: `SearchError::Throttled` (the backend asked us to slow
/// down, retrying after a backoff can work) and
/// `SearchError::Unavailable` (retrying now won't help).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search the web, returning at most `max_results` hits.
    async fn search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>>;
}
