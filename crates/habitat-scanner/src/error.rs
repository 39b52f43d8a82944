use habitat_browser::BrowserError;
use thiserror::Error;

/// Errors raised while scraping a site.
///
/// Only [`ScanError::PageLoad`] and [`ScanError::ListingLoad`] are recoverable;
/// the first is recorded on the affected record, the second ends the section.
/// Everything else aborts the run.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A detail page could not be loaded within the retry bound
    #[error("failed to load {url} after {attempts} attempts: {cause}")]
    PageLoad {
        /// Page that failed
        url: String,
        /// Attempts made
        attempts: u32,
        /// Last failure reported by the browser
        #[source]
        cause: BrowserError,
    },

    /// A listing page could not be loaded within the retry bound
    #[error("failed to load listing page {url} after {attempts} attempts: {cause}")]
    ListingLoad {
        /// Listing page that failed
        url: String,
        /// Attempts made
        attempts: u32,
        /// Last failure reported by the browser
        #[source]
        cause: BrowserError,
    },

    /// A section URL template did not produce a usable page URL
    #[error("cannot build page {page} from template {template}: {reason}")]
    InvalidPageUrl {
        /// Template as written in the site definition
        template: String,
        /// Requested page number
        page: u32,
        /// Why the URL was rejected
        reason: String,
    },

    /// The browser became unusable
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    /// Site definition could not be used
    #[error("Site error: {0}")]
    Site(#[from] habitat_site::SiteError),

    /// Listing selectors failed to compile
    #[error("Extraction error: {0}")]
    Extract(#[from] habitat_extract::ExtractError),

    /// Export I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// Whether this error must abort the run.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::PageLoad { .. } | Self::ListingLoad { .. })
    }

    /// Reclassify a page-load failure as a listing-page failure.
    #[must_use]
    pub fn into_listing_failure(self) -> Self {
        match self {
            Self::PageLoad {
                url,
                attempts,
                cause,
            } => Self::ListingLoad {
                url,
                attempts,
                cause,
            },
            other => other,
        }
    }
}

/// Result type for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
