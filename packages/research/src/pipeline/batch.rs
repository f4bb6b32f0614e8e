//! Batch orchestration.
//!
//! Drives each entity through search, fetch, and extraction, and folds
//! the outcomes into one report. Failure isolation is the core
//! contract: anything that goes wrong with one entity becomes that
//! entity's `Failed` record, and the batch moves on.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{BatchError, EntityError, ExtractError, SearchError};
use crate::pipeline::pacing::{Pacer, ThrottleBackoff};
use crate::progress::ProgressObserver;
use crate::query::render_query;
use crate::traits::extractor::{Extractor, ModelResponse};
use crate::traits::fetcher::{ContentFetcher, PageContent};
use crate::traits::searcher::{SearchHit, SearchProvider};
use crate::types::{BatchConfig, BatchReport, ResearchRecord};

/// Runs the search, fetch, and extract pipeline over a list of entities.
///
/// One record comes out per entity, in input order, no matter what
/// failed along the way. The orchestrator owns pacing, throttle
/// backoff, the single extraction retry, timeouts, and cancellation;
/// the backends behind the trait seams stay oblivious to all of it.
///
/// # Example
///
/// ```rust,ignore
/// use research::extractors::GroqExtractor;
/// use research::fetchers::HttpFetcher;
/// use research::pipeline::BatchOrchestrator;
/// use research::searchers::DuckDuckGoSearcher;
/// use research::types::BatchConfig;
///
/// let orchestrator = BatchOrchestrator::new(
///     DuckDuckGoSearcher::new(),
///     HttpFetcher::new(),
///     GroqExtractor::from_env()?,
///     BatchConfig::new(),
/// );
///
/// let entities = vec!["Acme Corp".to_string(), "Globex".to_string()];
/// let report = orchestrator.run(&entities).await?;
/// ```
pub struct BatchOrchestrator<S: SearchProvider, F: ContentFetcher, X: Extractor> {
    searcher: S,
    fetcher: F,
    extractor: X,
    config: BatchConfig,
    pacer: Pacer,
    backoff: ThrottleBackoff,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl<S: SearchProvider, F: ContentFetcher, X: Extractor> BatchOrchestrator<S, F, X> {
    /// Create an orchestrator over the three backends.
    pub fn new(searcher: S, fetcher: F, extractor: X, config: BatchConfig) -> Self {
        let pacer = Pacer::new(config.per_entity_delay);
        let backoff = ThrottleBackoff::new(config.throttle_backoff);
        Self {
            searcher,
            fetcher,
            extractor,
            config,
            pacer,
            backoff,
            observer: None,
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Run the batch to completion.
    pub async fn run(&self, entities: &[String]) -> Result<BatchReport, BatchError> {
        self.run_with_cancel(entities, CancellationToken::new())
            .await
    }

    /// Run the batch with cooperative cancellation.
    ///
    /// Once `cancel` fires, the in-flight entity stops at its next
    /// await point and every remaining entity gets a `Failed` record
    /// noting the cancellation. The report still holds one record per
    /// input entity.
    pub async fn run_with_cancel(
        &self,
        entities: &[String],
        cancel: CancellationToken,
    ) -> Result<BatchReport, BatchError> {
        self.config.validate()?;

        let total = entities.len();
        info!(total, "batch starting");

        let mut report = BatchReport::with_capacity(total);
        for (index, entity) in entities.iter().enumerate() {
            let query = render_query(&self.config.template, entity);

            let record = if cancel.is_cancelled() {
                ResearchRecord::failed(entity.as_str(), &query, EntityError::Cancelled.to_string())
            } else {
                match self.research_entity(entity, &query, &cancel).await {
                    Ok(record) => record,
                    Err(err) => {
                        warn!(entity = %entity, error = %err, "entity failed");
                        ResearchRecord::failed(entity.as_str(), &query, err.to_string())
                    }
                }
            };

            report.push(record);
            if let Some(observer) = &self.observer {
                observer.entity_completed(index + 1, total, entity);
            }
        }

        info!(
            total,
            success = report.success_count(),
            partial = report.partial_count(),
            failed = report.failed_count(),
            "batch finished"
        );
        Ok(report)
    }

    /// Take one entity through the full pipeline.
    async fn research_entity(
        &self,
        entity: &str,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<ResearchRecord, EntityError> {
        tokio::select! {
            _ = self.pacer.acquire() => {}
            _ = cancel.cancelled() => return Err(EntityError::Cancelled),
        }

        debug!(entity, query, "searching");
        let hits = self.search_with_backoff(query, cancel).await?;
        if hits.is_empty() {
            return Err(EntityError::NoResults);
        }
        if cancel.is_cancelled() {
            return Err(EntityError::Cancelled);
        }

        debug!(entity, hits = hits.len(), "fetching");
        let pages = self.fetch_hits(&hits).await;
        let (aggregated, sources) = aggregate_pages(
            &hits,
            &pages,
            self.config.max_page_chars,
            self.config.max_aggregate_chars,
        );
        if aggregated.is_empty() {
            return Err(EntityError::NoContent);
        }
        if cancel.is_cancelled() {
            return Err(EntityError::Cancelled);
        }

        debug!(entity, bytes = aggregated.len(), "extracting");
        let response = self.extract_with_retry(entity, &aggregated, cancel).await?;

        Ok(match response {
            ModelResponse::Structured(analysis) => {
                ResearchRecord::success(entity, query, analysis, sources)
            }
            ModelResponse::Degraded { raw } => {
                warn!(entity, "model output kept as raw text");
                ResearchRecord::partial(entity, query, raw, sources)
            }
        })
    }

    /// Search, waiting out throttle responses up to the retry budget.
    async fn search_with_backoff(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchHit>, EntityError> {
        let mut attempt: u32 = 0;
        loop {
            let outcome = tokio::select! {
                outcome = tokio::time::timeout(
                    self.config.search_timeout,
                    self.searcher.search(query, self.config.max_search_results),
                ) => outcome.unwrap_or_else(|_| {
                    Err(SearchError::Unavailable("search timed out".into()))
                }),
                _ = cancel.cancelled() => return Err(EntityError::Cancelled),
            };

            match outcome {
                Ok(hits) => return Ok(hits),
                Err(SearchError::Throttled { retry_after })
                    if attempt < self.config.throttle_retries =>
                {
                    attempt += 1;
                    let delay = self.backoff.delay_for(attempt, retry_after);
                    warn!(
                        query,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "search throttled, backing off"
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(EntityError::Cancelled),
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Fetch all hit pages concurrently, preserving hit order.
    async fn fetch_hits(&self, hits: &[SearchHit]) -> Vec<PageContent> {
        let timeout = self.config.fetch_timeout;
        let mut indexed: Vec<(usize, PageContent)> = stream::iter(hits.iter().enumerate())
            .map(|(index, hit)| {
                let url = hit.url.to_string();
                async move { (index, self.fetcher.fetch(&url, timeout).await) }
            })
            .buffer_unordered(self.config.fetch_concurrency)
            .collect()
            .await;

        // buffer_unordered yields in completion order
        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, page)| page).collect()
    }

    /// Extract, retrying once if the backend was unavailable.
    async fn extract_with_retry(
        &self,
        entity: &str,
        aggregated: &str,
        cancel: &CancellationToken,
    ) -> Result<ModelResponse, EntityError> {
        match self.try_extract(entity, aggregated, cancel).await {
            Err(EntityError::Extract(ExtractError::Unavailable(err))) => {
                warn!(entity, error = %err, "extraction failed, retrying once");
                tokio::select! {
                    _ = tokio::time::sleep(self.config.extract_retry_delay) => {}
                    _ = cancel.cancelled() => return Err(EntityError::Cancelled),
                }
                self.try_extract(entity, aggregated, cancel).await
            }
            outcome => outcome,
        }
    }

    async fn try_extract(
        &self,
        entity: &str,
        aggregated: &str,
        cancel: &CancellationToken,
    ) -> Result<ModelResponse, EntityError> {
        let outcome = tokio::select! {
            outcome = tokio::time::timeout(
                self.config.extract_timeout,
                self.extractor.extract(entity, aggregated),
            ) => outcome.unwrap_or_else(|_| {
                Err(ExtractError::Unavailable("extraction timed out".into()))
            }),
            _ = cancel.cancelled() => return Err(EntityError::Cancelled),
        };
        outcome.map_err(EntityError::from)
    }
}

/// Stitch fetched pages into one model-ready document.
///
/// Sections follow hit order and carry the hit title and snippet as
/// context. Failed pages are skipped and their URLs stay out of the
/// sources list. Each page's text is capped at `max_page_chars` and the
/// whole document at `max_aggregate_chars`.
pub(crate) fn aggregate_pages(
    hits: &[SearchHit],
    pages: &[PageContent],
    max_page_chars: usize,
    max_aggregate_chars: usize,
) -> (String, Vec<String>) {
    let mut sections: Vec<String> = Vec::new();
    let mut sources: Vec<String> = Vec::new();
    let mut used: usize = 0;

    for (hit, page) in hits.iter().zip(pages.iter()) {
        if !page.status.is_ok() {
            continue;
        }

        let remaining = max_aggregate_chars.saturating_sub(used);
        if remaining == 0 {
            break;
        }

        let mut section = if hit.title.is_empty() {
            format!("## {}\n", page.url)
        } else {
            format!("## {} ({})\n", hit.title, page.url)
        };
        if !hit.snippet.is_empty() {
            section.push_str(&hit.snippet);
            section.push('\n');
        }
        section.push_str(&truncate_chars(&page.extracted_text, max_page_chars));

        let section = truncate_chars(&section, remaining);
        used += section.chars().count();
        sections.push(section);
        sources.push(page.url.clone());
    }

    (sections.join("\n\n"), sources)
}

/// Truncate to a character count without splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
