//! Request pacing and throttle backoff.
//!
//! Two separate mechanisms: `Pacer` spaces entity starts using the
//! governor crate, so a batch never hammers the search backend at full
//! speed; `ThrottleBackoff` decides how long to wait once a backend has
//! already said "slow down".

use std::sync::Arc;
use std::time::Duration;

use governor::{Quota, RateLimiter};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Enforces a minimum interval between entity starts.
///
/// The first acquire is immediate; later ones wait out the interval.
/// A zero interval disables pacing entirely.
pub struct Pacer {
    limiter: Option<Arc<DefaultRateLimiter>>,
}

impl Pacer {
    /// Create a pacer with the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        // Quota::with_period rejects a zero period, which is exactly
        // the "no pacing" case.
        let limiter =
            Quota::with_period(min_interval).map(|quota| Arc::new(RateLimiter::direct(quota)));
        Self { limiter }
    }

    /// Wait until the next start is allowed.
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

/// Escalating delay schedule for throttled search backends.
#[derive(Debug, Clone, Copy)]
pub struct ThrottleBackoff {
    base: Duration,
    cap: Duration,
}

impl ThrottleBackoff {
    /// Create a backoff schedule from a base delay. Delays cap at five
    /// minutes unless overridden.
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            cap: Duration::from_secs(300),
        }
    }

    /// Set the maximum delay.
    pub fn with_cap(mut self, cap: Duration) -> Self {
        self.cap = cap;
        self
    }

    /// Delay before retry number `attempt` (1-based).
    ///
    /// Doubles per attempt from the base. A server-provided
    /// `Retry-After` hint wins when it asks for longer than the
    /// schedule would wait; the cap bounds both.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let computed = self
            .base
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.cap);

        match retry_after {
            Some(hint) => hint.max(computed).min(self.cap),
            None => computed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_backoff_escalates() {
        let backoff = ThrottleBackoff::new(Duration::from_secs(1));
        assert_eq!(backoff.delay_for(1, None), Duration::from_secs(1));
        assert_eq!(backoff.delay_for(2, None), Duration::from_secs(2));
        assert_eq!(backoff.delay_for(3, None), Duration::from_secs(4));
    }

    #[test]
    fn test_backoff_respects_cap() {
        let backoff = ThrottleBackoff::new(Duration::from_secs(1)).with_cap(Duration::from_secs(3));
        assert_eq!(backoff.delay_for(3, None), Duration::from_secs(3));
        assert_eq!(backoff.delay_for(10, None), Duration::from_secs(3));
    }

    #[test]
    fn test_retry_after_hint_wins_when_larger() {
        let backoff = ThrottleBackoff::new(Duration::from_secs(1));
        assert_eq!(
            backoff.delay_for(1, Some(Duration::from_secs(10))),
            Duration::from_secs(10)
        );
        // Schedule already asks for longer than the hint
        assert_eq!(
            backoff.delay_for(3, Some(Duration::from_secs(1))),
            Duration::from_secs(4)
        );
    }

    #[test]
    fn test_retry_after_hint_is_capped() {
        let backoff = ThrottleBackoff::new(Duration::from_secs(1)).with_cap(Duration::from_secs(5));
        assert_eq!(
            backoff.delay_for(1, Some(Duration::from_secs(60))),
            Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn test_pacer_spaces_acquires() {
        let pacer = Pacer::new(Duration::from_millis(200));

        let start = Instant::now();
        pacer.acquire().await;
        pacer.acquire().await;
        pacer.acquire().await;
        let elapsed = start.elapsed();

        // First is immediate, 2nd and 3rd each wait 200ms
        assert!(elapsed.as_millis() >= 400, "Pacing not working: {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_zero_interval_is_immediate() {
        let pacer = Pacer::new(Duration::ZERO);

        let start = Instant::now();
        for _ in 0..5 {
            pacer.acquire().await;
        }
        assert!(start.elapsed().as_millis() < 100);
    }
}
