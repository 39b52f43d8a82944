//! Browser automation for JavaScript-heavy listing sites.
//!
//! Provides the [`PageFetcher`] seam the scanner consumes and a headless
//! Chromium implementation with a randomized fingerprint.

pub mod engine;
pub mod error;
pub mod fetch;
pub mod fingerprint;

pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use fetch::{extract_domain, PageFetcher};
pub use fingerprint::FingerprintConfig;
