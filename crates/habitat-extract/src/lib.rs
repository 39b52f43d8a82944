//! Habitat Extract - Field recovery from inconsistently structured listing pages.
//!
//! Detail pages on the same site are rendered by several templates, so one
//! attribute can sit in a definition list, a table, a bullet list, a block of
//! prose or an icon-labelled span. This crate recovers the canonical fields
//! regardless of where they appear:
//!
//! - [`normalize`] - label canonicalization and label → field matching
//! - [`clean`] - per-field value canonicalization (price, area, counts, year)
//! - [`strategies`] - the individual extraction methods
//! - [`extractor`] - priority-ordered, non-destructive merge of the methods
//! - [`listing`] - listing-page card parsing into detail candidates
//!
//! # Example
//!
//! ```rust
//! use habitat_core::CanonicalField;
//! use habitat_extract::MultiStrategyExtractor;
//!
//! let extractor = MultiStrategyExtractor::default();
//! let extraction = extractor.extract_html("<dl><dt>Alcobas</dt><dd>3</dd></dl>");
//! assert_eq!(extraction.fields.get(&CanonicalField::Bedrooms).map(String::as_str), Some("3"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod clean;
mod dom;
pub mod error;
pub mod extractor;
pub mod listing;
pub mod normalize;
pub mod strategies;

// Re-export commonly used types
pub use clean::clean;
pub use error::{ExtractError, Result};
pub use extractor::{merge_partial, Extraction, MultiStrategyExtractor};
pub use listing::{ListingCandidate, ListingParser, ListingSelectors};
pub use normalize::{normalize, FieldNormalizer, LabelAlias, LabelMapping};
pub use strategies::Strategy;
