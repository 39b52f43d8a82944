//! Error types for extraction setup.
//!
//! Running an extraction never fails; only compiling caller-supplied
//! selectors can.

use thiserror::Error;

/// Errors raised while preparing an extractor or listing parser.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A configured CSS selector does not parse
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector text
        selector: String,
        /// Parser message
        reason: String,
    },
}

/// Result type for extraction setup.
pub type Result<T> = std::result::Result<T, ExtractError>;
