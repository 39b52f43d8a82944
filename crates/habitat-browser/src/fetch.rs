use crate::error::{BrowserError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Markup acquisition for one URL.
///
/// Implementations block until `readiness_marker` (a CSS selector) is present
/// in the loaded page or `timeout` elapses, then return the page markup.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    /// Load `url` and return its markup once `readiness_marker` is present.
    async fn fetch(&self, url: &str, readiness_marker: &str, timeout: Duration)
        -> Result<String>;
}

#[async_trait::async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch(
        &self,
        url: &str,
        readiness_marker: &str,
        timeout: Duration,
    ) -> Result<String> {
        (**self).fetch(url, readiness_marker, timeout).await
    }
}

/// Helper to extract domain from URL
pub fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url)
        .map_err(|e| BrowserError::NavigationError(format!("Invalid URL: {}", e)))?;

    url.host_str()
        .ok_or_else(|| BrowserError::NavigationError("No host in URL".to_string()))
        .map(|s| s.to_string())
}
