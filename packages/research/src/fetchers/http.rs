//! HTTP content fetcher.
//!
//! Fetches result pages and reduces them to plain text. Per-URL trouble
//! is reported through `FetchStatus`, never as an error: one dead link
//! must not cost an entity its other sources.

use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use crate::traits::fetcher::{ContentFetcher, FetchStatus, PageContent};

/// Guard against fetching internal endpoints.
///
/// Search hits come from the open web, but decoded redirects can point
/// anywhere. URLs aimed at loopback, private ranges, or cloud metadata
/// services are rejected before any request goes out.
struct UrlGuard {
    blocked_hosts: HashSet<&'static str>,
    blocked_cidrs: Vec<ipnet::IpNet>,
}

impl UrlGuard {
    fn new() -> Self {
        Self {
            blocked_hosts: [
                "localhost",
                "127.0.0.1",
                "::1",
                "[::1]",
                "0.0.0.0",
                "metadata.google.internal",
                "metadata.gke.internal",
                "instance-data",
            ]
            .into_iter()
            .collect(),
            blocked_cidrs: vec![
                "10.0.0.0/8".parse().unwrap(),
                "172.16.0.0/12".parse().unwrap(),
                "192.168.0.0/16".parse().unwrap(),
                "169.254.0.0/16".parse().unwrap(), // Link-local / cloud metadata
                "127.0.0.0/8".parse().unwrap(),    // Loopback
                "::1/128".parse().unwrap(),        // IPv6 loopback
                "fc00::/7".parse().unwrap(),       // IPv6 private
                "fe80::/10".parse().unwrap(),      // IPv6 link-local
            ],
        }
    }

    /// Parse and screen a URL. `None` means do not fetch it.
    fn check(&self, url: &str) -> Option<Url> {
        let parsed = Url::parse(url).ok()?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return None;
        }

        let host = parsed.host_str()?.to_ascii_lowercase();
        if self.blocked_hosts.contains(host.as_str()) {
            return None;
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            if self.blocked_cidrs.iter().any(|cidr| cidr.contains(&ip)) {
                return None;
            }
        }

        Some(parsed)
    }
}

/// Content fetcher that retrieves pages over HTTP and strips them to
/// plain text.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
    guard: UrlGuard,
    max_text_chars: usize,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            user_agent: "ResearchBot/1.0".to_string(),
            guard: UrlGuard::new(),
            max_text_chars: 8_000,
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Set the per-page cap on extracted text, in characters.
    pub fn with_max_text_chars(mut self, max: usize) -> Self {
        self.max_text_chars = max;
        self
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> PageContent {
        let Some(validated) = self.guard.check(url) else {
            warn!(url = %url, "URL rejected before fetch");
            return PageContent::failed(url, FetchStatus::ParseError);
        };

        debug!(url = %url, "page fetch starting");

        // The per-request timeout covers connect through body read and
        // overrides the client-wide default.
        let response = match self
            .client
            .get(validated)
            .header("User-Agent", &self.user_agent)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                warn!(url = %url, "page fetch timed out");
                return PageContent::failed(url, FetchStatus::Timeout);
            }
            Err(e) => {
                warn!(url = %url, error = %e, "page fetch failed");
                return PageContent::failed(url, FetchStatus::HttpError);
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, %status, "page fetch returned error status");
            return PageContent::failed(url, FetchStatus::HttpError);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();
        if !is_text_content(&content_type) {
            debug!(url = %url, content_type = %content_type, "skipping non-text content");
            return PageContent::failed(url, FetchStatus::ParseError);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                warn!(url = %url, "page body read timed out");
                return PageContent::failed(url, FetchStatus::Timeout);
            }
            Err(e) => {
                warn!(url = %url, error = %e, "page body read failed");
                return PageContent::failed(url, FetchStatus::HttpError);
            }
        };

        let text = truncate_chars(&html_to_text(&body), self.max_text_chars);
        if text.is_empty() {
            debug!(url = %url, "page yielded no text");
            return PageContent::failed(url, FetchStatus::ParseError);
        }

        debug!(url = %url, bytes = text.len(), "page fetched");
        PageContent::ok(url, text)
    }
}

/// Whether a content type is worth reducing to text.
fn is_text_content(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    // An absent header gets the benefit of the doubt.
    ct.is_empty() || ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
}

/// Convert HTML to plain text (simplified).
fn html_to_text(html: &str) -> String {
    let mut text = html.to_string();

    // Remove scripts, styles, and noscript blocks
    let script_pattern = regex::Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    let style_pattern = regex::Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    let noscript_pattern = regex::Regex::new(r"(?is)<noscript[^>]*>.*?</noscript>").unwrap();
    text = script_pattern.replace_all(&text, " ").to_string();
    text = style_pattern.replace_all(&text, " ").to_string();
    text = noscript_pattern.replace_all(&text, " ").to_string();

    // Block boundaries become line breaks so text from different
    // sections doesn't run together
    let block_pattern =
        regex::Regex::new(r"(?i)</?(p|div|section|article|li|tr|h[1-6])[^>]*>|<br\s*/?>").unwrap();
    text = block_pattern.replace_all(&text, "\n").to_string();

    // Remove remaining tags
    let tag_pattern = regex::Regex::new(r"<[^>]+>").unwrap();
    text = tag_pattern.replace_all(&text, " ").to_string();

    // Decode HTML entities
    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to a character count without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
