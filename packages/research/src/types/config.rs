//! Configuration for a batch research run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Default query template. `{entity}` is replaced per entity.
pub const DEFAULT_TEMPLATE: &str = "Latest developments and news about {entity}";

/// Configuration for the batch research pipeline.
///
/// Every knob has a conservative default; `BatchConfig::new()` is a
/// runnable configuration. Builders return `self` so configs compose
/// inline at the call site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Query template. Occurrences of `{entity}` are replaced with the
    /// entity name; templates without the placeholder get the entity
    /// appended.
    pub template: String,

    /// Maximum search hits to fetch per entity. Default: 3.
    pub max_search_results: usize,

    /// Minimum spacing between entity starts. Zero disables pacing.
    /// Default: 2s.
    pub per_entity_delay: Duration,

    /// Deadline for one search call (including the provider's internal
    /// retries). Default: 30s.
    pub search_timeout: Duration,

    /// Deadline for fetching one page, covering connect through body
    /// read. Default: 15s.
    pub fetch_timeout: Duration,

    /// Deadline for one model extraction call. Default: 60s.
    pub extract_timeout: Duration,

    /// How many page fetches run concurrently within one entity.
    /// Default: 4.
    pub fetch_concurrency: usize,

    /// Extra search attempts when the provider reports throttling.
    /// Default: 2.
    pub throttle_retries: u32,

    /// Base delay for throttle backoff; doubles per attempt. Default: 5s.
    pub throttle_backoff: Duration,

    /// Pause before the single extraction retry. Default: 2s.
    pub extract_retry_delay: Duration,

    /// Per-page cap on extracted text, in characters. Default: 8000.
    pub max_page_chars: usize,

    /// Cap on the aggregated text sent to the model, in characters.
    /// Default: 24000.
    pub max_aggregate_chars: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            max_search_results: 3,
            per_entity_delay: Duration::from_secs(2),
            search_timeout: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(15),
            extract_timeout: Duration::from_secs(60),
            fetch_concurrency: 4,
            throttle_retries: 2,
            throttle_backoff: Duration::from_secs(5),
            extract_retry_delay: Duration::from_secs(2),
            max_page_chars: 8_000,
            max_aggregate_chars: 24_000,
        }
    }
}

impl BatchConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Set the maximum search hits per entity.
    pub fn with_max_search_results(mut self, max: usize) -> Self {
        self.max_search_results = max;
        self
    }

    /// Set the spacing between entity starts.
    pub fn with_per_entity_delay(mut self, delay: Duration) -> Self {
        self.per_entity_delay = delay;
        self
    }

    /// Set the search deadline.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// Set the per-page fetch deadline.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the extraction deadline.
    pub fn with_extract_timeout(mut self, timeout: Duration) -> Self {
        self.extract_timeout = timeout;
        self
    }

    /// Set the per-entity fetch concurrency.
    pub fn with_fetch_concurrency(mut self, concurrency: usize) -> Self {
        self.fetch_concurrency = concurrency;
        self
    }

    /// Set the number of throttle retries for search.
    pub fn with_throttle_retries(mut self, retries: u32) -> Self {
        self.throttle_retries = retries;
        self
    }

    /// Set the base throttle backoff.
    pub fn with_throttle_backoff(mut self, backoff: Duration) -> Self {
        self.throttle_backoff = backoff;
        self
    }

    /// Set the pause before the extraction retry.
    pub fn with_extract_retry_delay(mut self, delay: Duration) -> Self {
        self.extract_retry_delay = delay;
        self
    }

    /// Set the per-page character cap.
    pub fn with_max_page_chars(mut self, max: usize) -> Self {
        self.max_page_chars = max;
        self
    }

    /// Set the aggregate character cap.
    pub fn with_max_aggregate_chars(mut self, max: usize) -> Self {
        self.max_aggregate_chars = max;
        self
    }

    /// Validate the config before a run.
    ///
    /// Rejections here are programming or wiring mistakes; a batch never
    /// starts with a config that cannot do useful work.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.template.trim().is_empty() {
            return Err(BatchError::InvalidConfig {
                reason: "template must not be empty".to_string(),
            });
        }
        if self.max_search_results == 0 {
            return Err(BatchError::InvalidConfig {
                reason: "max_search_results must be at least 1".to_string(),
            });
        }
        if self.fetch_concurrency == 0 {
            return Err(BatchError::InvalidConfig {
                reason: "fetch_concurrency must be at least 1".to_string(),
            });
        }
        if self.search_timeout.is_zero()
            || self.fetch_timeout.is_zero()
            || self.extract_timeout.is_zero()
        {
            return Err(BatchError::InvalidConfig {
                reason: "timeouts must be non-zero".to_string(),
            });
        }
        if self.max_page_chars == 0 || self.max_aggregate_chars == 0 {
            return Err(BatchError::InvalidConfig {
                reason: "character caps must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_builders_compose() {
        let config = BatchConfig::new()
            .with_max_search_results(5)
            .with_per_entity_delay(Duration::from_millis(500))
            .with_fetch_concurrency(2);
        assert_eq!(config.max_search_results, 5);
        assert_eq!(config.per_entity_delay, Duration::from_millis(500));
        assert_eq!(config.fetch_concurrency, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_template_rejected() {
        let config = BatchConfig::new().with_template("  ");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("template"));
    }

    #[test]
    fn test_zero_results_rejected() {
        let config = BatchConfig::new().with_max_search_results(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = BatchConfig::new().with_extract_timeout(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeouts"));
    }
}
