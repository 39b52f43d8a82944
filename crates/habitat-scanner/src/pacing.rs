//! Human-like pauses between page loads.

use habitat_core::ScrapingConfig;
use rand::Rng;
use std::time::Duration;

/// Fixed base delay plus uniform random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    base: Duration,
    jitter_min_ms: u64,
    jitter_max_ms: u64,
}

impl Pacer {
    /// Pacer waiting `base + jitter`, with jitter drawn from `jitter_min_ms..=jitter_max_ms`.
    #[must_use]
    pub fn new(base: Duration, jitter_min_ms: u64, jitter_max_ms: u64) -> Self {
        Self {
            base,
            jitter_min_ms: jitter_min_ms.min(jitter_max_ms),
            jitter_max_ms,
        }
    }

    /// Pacer built from the scraping configuration.
    #[must_use]
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self::new(
            Duration::from_millis(config.pacing_base_ms),
            config.pacing_jitter_min_ms,
            config.pacing_jitter_max_ms,
        )
    }

    /// Pacer that never waits.
    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, 0, 0)
    }

    /// Draw the next delay.
    #[must_use]
    pub fn next_delay(&self) -> Duration {
        let jitter = rand::thread_rng().gen_range(self.jitter_min_ms..=self.jitter_max_ms);
        self.base + Duration::from_millis(jitter)
    }

    /// Sleep for the next delay.
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        tracing::trace!(delay_ms = delay.as_millis(), "pacing");
        tokio::time::sleep(delay).await;
    }
}
