//! Page acquisition with bounded retries and pacing.

use crate::error::{Result, ScanError};
use crate::pacing::Pacer;
use habitat_browser::{BrowserError, PageFetcher};
use habitat_core::ScrapingConfig;
use std::time::Duration;

/// Loads pages through a [`PageFetcher`], retrying transient failures.
///
/// Every successful load is followed by a [`Pacer`] pause before the markup is
/// returned. Failures are retried up to `max_retries` attempts with a delay of
/// `retry_delay * attempt` in between; a fatal browser error is returned at
/// once without further attempts.
pub struct RetryingDetailFetcher<F> {
    fetcher: F,
    max_retries: u32,
    timeout: Duration,
    retry_delay: Duration,
    pacer: Pacer,
}

impl<F: PageFetcher> RetryingDetailFetcher<F> {
    /// Wrap `fetcher` with the retry, timeout and pacing settings of `config`.
    pub fn new(fetcher: F, config: &ScrapingConfig) -> Self {
        Self {
            fetcher,
            max_retries: config.max_retries.max(1),
            timeout: config.page_load_timeout(),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            pacer: Pacer::from_config(config),
        }
    }

    /// Underlying fetcher.
    pub fn inner(&self) -> &F {
        &self.fetcher
    }

    /// Attempts made per page before giving up.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Load `url`, waiting for `readiness_marker`.
    ///
    /// # Errors
    /// [`ScanError::PageLoad`] once every attempt failed, carrying the last
    /// failure; [`ScanError::Browser`] as soon as the browser reports a fatal error.
    pub async fn fetch(&self, url: &str, readiness_marker: &str) -> Result<String> {
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            match self.fetcher.fetch(url, readiness_marker, self.timeout).await {
                Ok(html) => {
                    tracing::debug!(url = %url, attempt, bytes = html.len(), "page loaded");
                    self.pacer.pause().await;
                    return Ok(html);
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(url = %url, attempt, error = %e, "browser unusable");
                    return Err(ScanError::Browser(e));
                }
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "page load failed"
                    );
                    last_error = Some(e);

                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(ScanError::PageLoad {
            url: url.to_string(),
            attempts: self.max_retries,
            cause: last_error
                .unwrap_or_else(|| BrowserError::NavigationError(format!("{url}: not attempted"))),
        })
    }
}
