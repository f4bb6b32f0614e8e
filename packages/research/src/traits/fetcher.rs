//! Content fetcher trait for retrieving page text.
//!
//! Fetching is deliberately infallible at the type level: a page that
//! cannot be retrieved comes back as a `PageContent` with a non-`Ok`
//! status, never as an `Err`. One dead link must not cost an entity its
//! other sources, so per-URL failure is data, not control flow.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What happened when fetching one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    /// Text was extracted.
    Ok,
    /// The request or body read exceeded the deadline.
    Timeout,
    /// Transport failure or non-success HTTP status.
    HttpError,
    /// The response was retrieved but yielded no usable text, or the URL
    /// was rejected before any request went out.
    ParseError,
}

impl FetchStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Extracted content for one fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// The URL that was fetched.
    pub url: String,

    /// Plain text extracted from the page. Empty unless `status` is `Ok`.
    pub extracted_text: String,

    /// How the fetch went.
    pub status: FetchStatus,
}

impl PageContent {
    /// A successful fetch with extracted text.
    pub fn ok(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extracted_text: text.into(),
            status: FetchStatus::Ok,
        }
    }

    /// A failed fetch with the reason recorded in the status.
    pub fn failed(url: impl Into<String>, status: FetchStatus) -> Self {
        Self {
            url: url.into(),
            extracted_text: String::new(),
            status,
        }
    }
}

/// Page content retrieval backend.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch a page and extract its text, within `timeout`.
    ///
    /// Never fails; trouble is reported through `PageContent::status`.
    async fn fetch(&self, url: &str, timeout: Duration) -> PageContent;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_page_has_text() {
        let page = PageContent::ok("https://example.com", "body text");
        assert!(page.status.is_ok());
        assert_eq!(page.extracted_text, "body text");
    }

    #[test]
    fn test_failed_page_is_empty() {
        let page = PageContent::failed("https://example.com", FetchStatus::Timeout);
        assert!(!page.status.is_ok());
        assert!(page.extracted_text.is_empty());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&FetchStatus::HttpError).unwrap();
        assert_eq!(json, "\"http_error\"");
    }
}
