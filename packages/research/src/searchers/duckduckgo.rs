//! DuckDuckGo search provider.
//!
//! Scrapes the DuckDuckGo HTML endpoint, which needs no API key. Result
//! links are redirect URLs (`/l/?uddg=...`) that get decoded back to
//! their targets before they leave this module.

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SearchError, SearchResult};
use crate::searchers::parse_retry_after;
use crate::traits::searcher::{SearchHit, SearchProvider};

const SEARCH_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

/// DuckDuckGo serves an empty "anomaly" challenge page with 202 when it
/// suspects automation. Treated as throttling, same as a 429.
const ANOMALY_STATUS: reqwest::StatusCode = reqwest::StatusCode::ACCEPTED;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Search provider backed by the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoSearcher {
    client: reqwest::Client,
    user_agent: String,
    max_retries: u32,
}

impl Default for DuckDuckGoSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl DuckDuckGoSearcher {
    /// Create a searcher with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 2,
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set how many times a failed request is retried.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch the results page, retrying transient failures.
    ///
    /// Throttling returns immediately without consuming retries; backoff
    /// for that lives in the pipeline, not here.
    async fn fetch_results_page(&self, query: &str) -> SearchResult<String> {
        let mut last_err: Option<SearchError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(500 * attempt as u64)).await;
            }

            let response = match self
                .client
                .get(SEARCH_ENDPOINT)
                .query(&[("q", query)])
                .header("User-Agent", &self.user_agent)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, attempt, "DuckDuckGo request failed");
                    last_err = Some(SearchError::Unavailable(Box::new(e)));
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status == ANOMALY_STATUS {
                return Err(SearchError::Throttled {
                    retry_after: parse_retry_after(response.headers()),
                });
            }
            if !status.is_success() {
                warn!(%status, attempt, "DuckDuckGo returned error status");
                last_err = Some(SearchError::Unavailable(
                    format!("DuckDuckGo returned status {}", status).into(),
                ));
                continue;
            }

            match response.text().await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(error = %e, attempt, "Failed to read DuckDuckGo response body");
                    last_err = Some(SearchError::Unavailable(Box::new(e)));
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| SearchError::Unavailable("request retries exhausted".into())))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearcher {
    async fn search(&self, query: &str, max_results: usize) -> SearchResult<Vec<SearchHit>> {
        info!(query, max_results, "DuckDuckGo search");

        let html = self.fetch_results_page(query).await?;
        let hits = parse_results_html(&html, max_results);

        debug!(query, hits = hits.len(), "DuckDuckGo search parsed");
        Ok(hits)
    }
}

/// Pull result links and snippets out of the results page markup.
///
/// DuckDuckGo marks result anchors with the `result__a` class and
/// snippets with `result__snippet`; both lists line up by position.
fn parse_results_html(html: &str, max_results: usize) -> Vec<SearchHit> {
    let anchor_pattern = regex::Regex::new(
        r#"(?s)<a[^>]*class="[^"]*result__a[^"]*"[^>]*href="([^"]+)"[^>]*>(.*?)</a>"#,
    )
    .unwrap();
    let snippet_pattern =
        regex::Regex::new(r#"(?s)<a[^>]*class="[^"]*result__snippet[^"]*"[^>]*>(.*?)</a>"#)
            .unwrap();

    let snippets: Vec<String> = snippet_pattern
        .captures_iter(html)
        .map(|cap| strip_tags(&cap[1]))
        .collect();

    let mut hits = Vec::new();
    for (index, cap) in anchor_pattern.captures_iter(html).enumerate() {
        if hits.len() >= max_results {
            break;
        }
        let Some(url) = decode_redirect(&cap[1]) else {
            continue;
        };
        let mut hit = SearchHit::new(url).with_title(strip_tags(&cap[2]));
        if let Some(snippet) = snippets.get(index) {
            hit = hit.with_snippet(snippet.clone());
        }
        hits.push(hit);
    }

    hits
}

/// Decode a result href into the target URL.
///
/// Result links are protocol-relative redirects through
/// `//duckduckgo.com/l/?uddg=<encoded target>`; direct links pass
/// through unchanged.
fn decode_redirect(href: &str) -> Option<Url> {
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        href.to_string()
    };

    let url = Url::parse(&absolute).ok()?;
    if url.path().starts_with("/l/") {
        let target = url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())?;
        Url::parse(&target).ok()
    } else {
        Some(url)
    }
}

/// Strip markup from a captured fragment, leaving readable text.
fn strip_tags(fragment: &str) -> String {
    let tag_pattern = regex::Regex::new(r"<[^>]+>").unwrap();
    let text = tag_pattern.replace_all(fragment, " ").to_string();

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_FIXTURE: &str = r#"
        <div class="result results_links results_links_deep web-result">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fnews%2Facme&amp;rut=abc123">
                Acme <b>Corp</b> expands
            </a>
            <a class="result__snippet" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fnews%2Facme">
                Acme Corp announced a new <b>European</b> office&#39;s opening.
            </a>
        </div>
        <div class="result results_links results_links_deep web-result">
            <a rel="nofollow" class="result__a" href="https://other.example.org/report">
                Industry report
            </a>
            <a class="result__snippet" href="https://other.example.org/report">
                Full industry report for the year.
            </a>
        </div>
        <div class="result results_links results_links_deep web-result">
            <a rel="nofollow" class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fthird.example.net%2F">
                Third result
            </a>
        </div>
    "#;

    #[test]
    fn test_parse_results_decodes_redirects() {
        let hits = parse_results_html(RESULTS_FIXTURE, 10);
        assert_eq!(hits.len(), 3);

        assert_eq!(hits[0].url.as_str(), "https://example.com/news/acme");
        assert_eq!(hits[0].title, "Acme Corp expands");
        assert_eq!(
            hits[0].snippet,
            "Acme Corp announced a new European office's opening."
        );

        assert_eq!(hits[1].url.as_str(), "https://other.example.org/report");
        assert_eq!(hits[1].title, "Industry report");

        assert_eq!(hits[2].url.as_str(), "https://third.example.net/");
        assert_eq!(hits[2].snippet, "");
    }

    #[test]
    fn test_parse_results_respects_cap() {
        let hits = parse_results_html(RESULTS_FIXTURE, 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url.as_str(), "https://example.com/news/acme");
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results_html("<html><body>anomaly</body></html>", 5).is_empty());
    }

    #[test]
    fn test_decode_redirect_forms() {
        let decoded =
            decode_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage%3Fa%3D1")
                .unwrap();
        assert_eq!(decoded.as_str(), "https://example.com/page?a=1");

        let direct = decode_redirect("https://example.com/direct").unwrap();
        assert_eq!(direct.as_str(), "https://example.com/direct");

        assert!(decode_redirect("//duckduckgo.com/l/?rut=onlytracking").is_none());
        assert!(decode_redirect("not a url").is_none());
    }

    #[test]
    fn test_strip_tags_decodes_entities() {
        assert_eq!(
            strip_tags("  Tom &amp; <b>Jerry</b>&nbsp;Inc&#39;s "),
            "Tom & Jerry Inc's"
        );
    }

    // Hits the real endpoint; run manually with --ignored.
    #[tokio::test]
    #[ignore]
    async fn test_live_search() {
        let searcher = DuckDuckGoSearcher::new();
        let hits = searcher.search("rust programming language", 3).await.unwrap();
        assert!(!hits.is_empty());
        assert!(hits.len() <= 3);
    }
}
