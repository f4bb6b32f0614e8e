//! Search provider implementations.
//!
//! - `DuckDuckGoSearcher` - scrapes the DuckDuckGo HTML endpoint, no key
//! - `TavilySearcher` - Tavily search API, requires an API key

pub mod duckduckgo;
pub mod tavily;

pub use duckduckgo::DuckDuckGoSearcher;
pub use tavily::TavilySearcher;

use std::time::Duration;

/// Read a `Retry-After` header as a delay hint.
///
/// Only the delta-seconds form is honored; HTTP-date values are rare on
/// search endpoints and not worth parsing.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};

    #[test]
    fn test_parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_retry_after_absent_or_dated() {
        assert_eq!(parse_retry_after(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }
}
