//! Habitat Site - Site definition system for listing scrapers.
//!
//! Each supported site is described by one TOML file under
//! `site-definitions/`: its sections (for example "Sales" and "Rentals") with
//! their listing URL templates, the CSS selectors locating listing cards, and
//! any site-specific label variants. Adding a site means adding a file, not code.
//!
//! # Architecture
//!
//! - **Definition Types** ([`definition`]): Strongly-typed site metadata and sections
//! - **Loader** ([`loader`]): TOML file loading from the `site-definitions/` directory
//! - **Errors** ([`error`]): Site-specific error types
//!
//! # Example
//!
//! ```rust,no_run
//! use habitat_core::SiteId;
//! use habitat_site::SiteLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = SiteLoader::with_default_dir()?;
//! let site = loader.load(&SiteId::new("bogota-real-estate")?)?;
//!
//! for section in &site.sections {
//!     println!("{}: {}", section.name, section.url_template);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod definition;
pub mod error;
pub mod loader;

// Re-export commonly used types
pub use definition::{SectionDefinition, SiteDefinition, SiteMetadata};
pub use error::{Result, SiteError};
pub use loader::SiteLoader;
