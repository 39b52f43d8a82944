//! Habitat Core - Foundation crate for the Habitat listing scraper.
//!
//! This crate provides the canonical record model, error handling and
//! configuration management that all other Habitat crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Canonical fields, property records and section collections
//!
//! # Example
//!
//! ```rust
//! use habitat_core::{AppConfig, CanonicalField, PropertyRecord, SENTINEL};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.scraping.max_retries, 3);
//!
//! let record = PropertyRecord::new();
//! assert_eq!(record.get(CanonicalField::Bedrooms), SENTINEL);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, BrowserConfig, ExportConfig, ScrapingConfig};
pub use error::{ConfigError, ConfigResult, HabitatError, Result};
pub use types::{
    is_sentinel, CanonicalField, FieldMap, PropertyRecord, SectionCollection, SiteId, SENTINEL,
};
