//! Site definition types and structures.
//!
//! This module defines the data structures for site definitions loaded from TOML files.

use crate::error::{Result, SiteError};
use habitat_core::SiteId;
use habitat_extract::{FieldNormalizer, LabelAlias, LabelMapping, ListingParser, ListingSelectors};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use url::Url;

/// Placeholder substituted with the page number in section URL templates.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Complete site definition loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteDefinition {
    /// Core site metadata
    pub site: SiteMetadata,

    /// Business-type partitions scraped independently, in run order
    pub sections: Vec<SectionDefinition>,

    /// Listing card selectors
    #[serde(default)]
    pub listing: ListingSelectors,

    /// Site-specific label variants added to the default mapping
    #[serde(default)]
    pub labels: Vec<LabelAlias>,
}

impl SiteDefinition {
    /// Get the site ID.
    #[must_use]
    pub fn id(&self) -> &SiteId {
        &self.site.id
    }

    /// Get the site name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.site.name
    }

    /// Readiness marker for detail pages, falling back to `default`.
    #[must_use]
    pub fn detail_readiness_marker<'a>(&'a self, default: &'a str) -> &'a str {
        self.site
            .detail_readiness_marker
            .as_deref()
            .filter(|marker| !marker.trim().is_empty())
            .unwrap_or(default)
    }

    /// Compile the listing selectors.
    pub fn listing_parser(&self) -> Result<ListingParser> {
        Ok(ListingParser::new(&self.listing)?)
    }

    /// Label normalizer with this site's variants appended to the defaults.
    #[must_use]
    pub fn field_normalizer(&self) -> FieldNormalizer {
        FieldNormalizer::new(LabelMapping::with_aliases(&self.labels))
    }

    /// Validate the site definition for completeness and correctness.
    pub fn validate(&self) -> Result<()> {
        if self.site.name.trim().is_empty() {
            return Err(self.invalid("site name cannot be empty"));
        }

        Self::parse_http_url(&self.site.base_url)
            .map_err(|reason| self.invalid(&format!("base_url {reason}")))?;

        if self.sections.is_empty() {
            return Err(self.invalid("at least one section is required"));
        }

        let mut names = HashSet::new();
        for section in &self.sections {
            section.validate().map_err(|reason| self.invalid(&reason))?;
            if !names.insert(section.name.trim().to_lowercase()) {
                return Err(self.invalid(&format!("duplicate section '{}'", section.name)));
            }
        }

        self.listing_parser()
            .map_err(|e| self.invalid(&e.to_string()))?;

        for alias in &self.labels {
            if alias.label.trim().is_empty() {
                return Err(self.invalid("label aliases cannot be empty"));
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> SiteError {
        SiteError::ValidationError {
            site_id: self.site.id.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse_http_url(raw: &str) -> std::result::Result<Url, String> {
        let url = Url::parse(raw).map_err(|e| format!("'{raw}' is not a valid URL: {e}"))?;
        if matches!(url.scheme(), "http" | "https") {
            Ok(url)
        } else {
            Err(format!("'{raw}' must use http or https"))
        }
    }
}

/// Core site metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Unique site identifier (e.g., "bogota-real-estate")
    pub id: SiteId,

    /// Human-readable site name
    pub name: String,

    /// Site home page
    pub base_url: String,

    /// CSS selector marking a loaded detail page, when `body` is not enough
    #[serde(default)]
    pub detail_readiness_marker: Option<String>,
}

/// One business-type partition of a site (e.g. "Sales", "Rentals").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDefinition {
    /// Section name, copied into every record's `Section` column
    pub name: String,

    /// Listing URL; either carries a `{page}` placeholder or gets a `page`
    /// query parameter set per page
    pub url_template: String,
}

impl SectionDefinition {
    /// Section with the given name and listing URL template.
    #[must_use]
    pub fn new(name: impl Into<String>, url_template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_template: url_template.into(),
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("section name cannot be empty".to_string());
        }
        let sample = self.url_template.replace(PAGE_PLACEHOLDER, "1");
        SiteDefinition::parse_http_url(&sample)
            .map(|_| ())
            .map_err(|reason| format!("section '{}' url_template {reason}", self.name))
    }
}
