use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("chromium error: {0}")]
    ChromiumError(String),

    #[error("navigation failed: {0}")]
    NavigationError(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("browser session closed: {0}")]
    SessionClosed(String),
}

impl BrowserError {
    /// Whether the browser can no longer serve any request.
    ///
    /// Navigation failures and readiness timeouts concern a single page and
    /// are worth retrying; a dead Chromium process or CDP connection is not.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ChromiumError(_) | Self::SessionClosed(_))
    }
}
