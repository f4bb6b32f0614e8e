//! Tavily search provider.
//!
//! Uses Tavily's search API. Requires an API key; the CLI picks this
//! provider up automatically when `TAVILY_API_KEY` is set.

use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use crate::error::{SearchError, SearchResult};
use crate::searchers::parse_retry_after;
use crate::security::ApiKey;
use crate::traits::searcher::{SearchHit, SearchProvider};

const SEARCH_ENDPOINT: &str = "https://api.tavily.com/search";

/// Search provider backed by the Tavily API.
pub struct TavilySearcher {
    api_key: ApiKey,
    client: reqwest::Client,
    max_retries: u32,
}

impl TavilySearcher {
    /// Create a searcher with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: ApiKey::new(api_key),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            max_retries: 2,
        }
    }

    /// Set how many times a failed request is retried.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

#[async_trait]
impl SearchProvider for TavilySearcher {
    async fn search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        info!(query, max_results, "Tavily search");

        let request = Request {
            query: query.to_string(),
            search_depth: "basic".to_string(),
            max_results,
        };

        let mut last_err: Option<SearchError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(500 * attempt as u64)).await;
            }

            let response = match self
                .client
                .post(SEARCH_ENDPOINT)
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {}", self.api_key.expose()))
                .json(&request)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, attempt, "Tavily request failed");
                    last_err = Some(SearchError::Unavailable(Box::new(e)));
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(SearchError::Throttled {
                    retry_after: parse_retry_after(response.headers()),
                });
            }
            if !status.is_success() {
                warn!(%status, attempt, "Tavily returned error status");
                last_err = Some(SearchError::Unavailable(
                    format!("Tavily returned status {}", status).into(),
                ));
                continue;
            }

            let parsed: Response = match response.json().await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(error = %e, attempt, "Failed to decode Tavily response");
                    last_err = Some(SearchError::Unavailable(Box::new(e)));
                    continue;
                }
            };

            return Ok(map_results(parsed.results, max_results));
        }

        Err(last_err
            .unwrap_or_else(|| SearchError::Unavailable("request retries exhausted".into())))
    }
}

/// Convert Tavily result entries into hits, dropping unparseable URLs.
fn map_results(results: Vec<TavilyResult>, max_results: usize) -> Vec<SearchHit> {
    results
        .into_iter()
        .filter_map(|r| {
            let url = Url::parse(&r.url).ok()?;
            let mut hit = SearchHit::new(url);
            if let Some(title) = r.title {
                hit = hit.with_title(title);
            }
            if let Some(content) = r.content {
                hit = hit.with_snippet(content);
            }
            Some(hit)
        })
        .take(max_results)
        .collect()
}

// Request/Response types

#[derive(serde::Serialize)]
struct Request {
    query: String,
    search_depth: String,
    max_results: usize,
}

#[derive(serde::Deserialize)]
struct Response {
    results: Vec<TavilyResult>,
}

#[derive(serde::Deserialize)]
struct TavilyResult {
    url: String,
    title: Option<String>,
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE_FIXTURE: &str = r#"{
        "query": "Acme Corp news",
        "results": [
            {
                "url": "https://news.example/acme-expansion",
                "title": "Acme expands into Europe",
                "content": "Acme Corp announced new offices in Berlin and Lisbon.",
                "score": 0.97
            },
            {
                "url": "not a url",
                "title": "Broken entry",
                "content": "Should be dropped."
            },
            {
                "url": "https://blog.example/acme",
                "title": null,
                "content": null
            },
            {
                "url": "https://third.example/acme",
                "title": "Third",
                "content": "Over the cap."
            }
        ],
        "response_time": 1.2
    }"#;

    #[test]
    fn test_builder() {
        let searcher = TavilySearcher::new("tvly-key").with_max_retries(0);
        assert_eq!(searcher.max_retries, 0);
        assert_eq!(searcher.api_key.expose(), "tvly-key");
    }

    #[test]
    fn test_maps_response_fixture() {
        let parsed: Response = serde_json::from_str(RESPONSE_FIXTURE).unwrap();
        let hits = map_results(parsed.results, 10);

        assert_eq!(hits.len(), 3, "entry with an unparseable URL is dropped");
        assert_eq!(hits[0].url.as_str(), "https://news.example/acme-expansion");
        assert_eq!(hits[0].title, "Acme expands into Europe");
        assert_eq!(
            hits[0].snippet,
            "Acme Corp announced new offices in Berlin and Lisbon."
        );
        assert_eq!(hits[1].url.as_str(), "https://blog.example/acme");
        assert!(hits[1].title.is_empty());
        assert!(hits[1].snippet.is_empty());
    }

    #[test]
    fn test_mapping_respects_max_results() {
        let parsed: Response = serde_json::from_str(RESPONSE_FIXTURE).unwrap();
        let hits = map_results(parsed.results, 2);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[1].url.as_str(), "https://blog.example/acme");
    }

    // Needs a real TAVILY_API_KEY; run manually with --ignored.
    #[tokio::test]
    #[ignore]
    async fn test_live_search() {
        let key = std::env::var("TAVILY_API_KEY").unwrap();
        let searcher = TavilySearcher::new(key);
        let hits = searcher.search("rust programming language", 3).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.len() <= 3);
    }
}
