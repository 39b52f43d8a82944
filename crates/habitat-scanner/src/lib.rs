//! Habitat Scanner - Listing site scraping orchestration.
//!
//! This crate drives a scrape run over one site: it walks every section's
//! listing pages, admits each detail URL once, fetches detail pages with
//! bounded retries and human-like pacing, extracts canonical records, and
//! writes the accumulated collections to CSV and JSON.
//!
//! # Features
//!
//! - Per-section pagination that stops at the page limit or the first empty page
//! - Retry with linear backoff for page loads; per-record failures are kept on the record
//! - Run-scoped URL deduplication
//! - Periodic and final export with a best-effort flush before a fatal error propagates
//!
//! # Example
//!
//! ```rust,ignore
//! use habitat_scanner::{BatchExporter, ScrapeOrchestrator, SelectorSite};
//!
//! let site = SelectorSite::new(definition, browser_engine, &config.scraping)?;
//! let exporter = BatchExporter::from_config(&config.export);
//! let summary = ScrapeOrchestrator::new(site, config.scraping.clone(), exporter)
//!     .run()
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod dedup;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod orchestrator;
pub mod pacing;
pub mod site;
pub mod url_builder;

// Re-export commonly used types
pub use dedup::Deduplicator;
pub use error::{Result, ScanError};
pub use export::{BatchExporter, ExportReport};
pub use fetcher::RetryingDetailFetcher;
pub use orchestrator::{RunSummary, ScrapeOrchestrator, SectionStats};
pub use pacing::Pacer;
pub use site::{SelectorSite, SiteAdapter};
pub use url_builder::build_page_url;
