//! Shared types used across the Habitat scraper.
//!
//! This module defines the canonical output schema ([`CanonicalField`]), the
//! per-listing record ([`PropertyRecord`]) and the per-section collection that
//! the orchestrator accumulates and the exporter writes.

use crate::error::HabitatError;
use chrono::Local;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Placeholder stored in every field that has not been populated.
pub const SENTINEL: &str = "N/A";

/// Returns true for the sentinel and for blank text.
#[must_use]
pub fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == SENTINEL
}

/// Partial field → value mapping produced by one extraction step.
pub type FieldMap = BTreeMap<CanonicalField, String>;

/// Newtype for site identifiers with validation.
///
/// Site IDs must be lowercase alphanumeric with hyphens, 3-50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// Create a new `SiteId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, HabitatError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(id: &str) -> Result<(), HabitatError> {
        static SITE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SITE_REGEX
            .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,48}[a-z0-9]$").expect("valid regex"));

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(HabitatError::Validation(format!(
                "invalid site ID: must be 3-50 lowercase alphanumeric characters or hyphens, got '{id}'"
            )))
        }
    }
}

impl TryFrom<String> for SiteId {
    type Error = HabitatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SiteId> for String {
    fn from(id: SiteId) -> Self {
        id.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attributes every exported property row carries, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    /// Country
    Country,
    /// Department / state
    State,
    /// City
    City,
    /// Locality (administrative subdivision of the city)
    Locality,
    /// Zone or neighborhood
    Neighborhood,
    /// Listing status (new, used, under construction, ...)
    Status,
    /// Built area, normalized to `<number> m²`
    #[serde(rename = "Built Area")]
    BuiltArea,
    /// Land area, normalized to `<number> m²`
    #[serde(rename = "Land Area")]
    LandArea,
    /// Bedroom count
    Bedrooms,
    /// Bathroom count
    Bathrooms,
    /// Parking spots
    Garage,
    /// Socio-economic stratum
    Stratum,
    /// Floor number
    Floor,
    /// Construction year
    #[serde(rename = "Year Built")]
    YearBuilt,
    /// Apartment, house, office, ...
    #[serde(rename = "Property Type")]
    PropertyType,
    /// Sale, rent, ...
    #[serde(rename = "Business Type")]
    BusinessType,
    /// Monthly administration fee
    #[serde(rename = "Administration Fee")]
    AdministrationFee,
    /// Asking price, normalized to `$<digits>`
    Price,
    /// Listing title
    Title,
    /// Detail page URL
    #[serde(rename = "URL")]
    Url,
    /// Local time the record was created
    #[serde(rename = "Extraction Date")]
    ExtractionDate,
    /// Page-load failure description
    Error,
    /// Business-type partition the record was scraped from
    Section,
}

impl CanonicalField {
    /// Number of canonical fields.
    pub const COUNT: usize = 23;

    /// Every field, in export column order.
    pub const ALL: [CanonicalField; Self::COUNT] = [
        Self::Country,
        Self::State,
        Self::City,
        Self::Locality,
        Self::Neighborhood,
        Self::Status,
        Self::BuiltArea,
        Self::LandArea,
        Self::Bedrooms,
        Self::Bathrooms,
        Self::Garage,
        Self::Stratum,
        Self::Floor,
        Self::YearBuilt,
        Self::PropertyType,
        Self::BusinessType,
        Self::AdministrationFee,
        Self::Price,
        Self::Title,
        Self::Url,
        Self::ExtractionDate,
        Self::Error,
        Self::Section,
    ];

    /// Column header used in CSV and JSON output.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::State => "State",
            Self::City => "City",
            Self::Locality => "Locality",
            Self::Neighborhood => "Neighborhood",
            Self::Status => "Status",
            Self::BuiltArea => "Built Area",
            Self::LandArea => "Land Area",
            Self::Bedrooms => "Bedrooms",
            Self::Bathrooms => "Bathrooms",
            Self::Garage => "Garage",
            Self::Stratum => "Stratum",
            Self::Floor => "Floor",
            Self::YearBuilt => "Year Built",
            Self::PropertyType => "Property Type",
            Self::BusinessType => "Business Type",
            Self::AdministrationFee => "Administration Fee",
            Self::Price => "Price",
            Self::Title => "Title",
            Self::Url => "URL",
            Self::ExtractionDate => "Extraction Date",
            Self::Error => "Error",
            Self::Section => "Section",
        }
    }

    /// Look a field up by its column header.
    #[must_use]
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.display_name() == name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One scraped listing.
///
/// Every canonical field is present from construction, holding [`SENTINEL`]
/// until a real value is written. Writes never turn a real value back into the
/// sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    values: [String; CanonicalField::COUNT],
}

impl PropertyRecord {
    /// Record with every field at the sentinel.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|_| SENTINEL.to_string()),
        }
    }

    /// Record for a listing candidate of `section`, stamped with the local time.
    #[must_use]
    pub fn for_listing(section: &str, url: &str, title: &str) -> Self {
        let mut record = Self::new();
        record.overwrite(CanonicalField::Section, section);
        record.overwrite(CanonicalField::Url, url);
        record.overwrite(CanonicalField::Title, title);
        record.overwrite(
            CanonicalField::ExtractionDate,
            &Local::now().format("%Y-%m-%d %H:%M").to_string(),
        );
        record
    }

    /// Current value of `field` (the sentinel when unset).
    #[must_use]
    pub fn get(&self, field: CanonicalField) -> &str {
        &self.values[field.index()]
    }

    /// Whether `field` holds a real value.
    #[must_use]
    pub fn is_set(&self, field: CanonicalField) -> bool {
        !is_sentinel(self.get(field))
    }

    /// Write `value` only if `field` is still at the sentinel.
    ///
    /// Returns true when the value was stored.
    pub fn fill(&mut self, field: CanonicalField, value: &str) -> bool {
        if self.is_set(field) || is_sentinel(value) {
            return false;
        }
        self.values[field.index()] = value.trim().to_string();
        true
    }

    /// Replace `field` with `value`, unless `value` is blank or the sentinel.
    ///
    /// Returns true when the value was stored.
    pub fn overwrite(&mut self, field: CanonicalField, value: &str) -> bool {
        if is_sentinel(value) {
            return false;
        }
        self.values[field.index()] = value.trim().to_string();
        true
    }

    /// Fill every field of `fields` that is still at the sentinel.
    ///
    /// Returns the number of fields that changed.
    pub fn fill_all(&mut self, fields: &FieldMap) -> usize {
        fields
            .iter()
            .filter(|(field, value)| self.fill(**field, value))
            .count()
    }

    /// Record a page-load failure.
    pub fn set_error(&mut self, message: &str) {
        self.overwrite(CanonicalField::Error, message);
    }

    /// Failure description, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.is_set(CanonicalField::Error)
            .then(|| self.get(CanonicalField::Error))
    }

    /// Detail page URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.get(CanonicalField::Url)
    }

    /// Section the record belongs to.
    #[must_use]
    pub fn section(&self) -> &str {
        self.get(CanonicalField::Section)
    }

    /// `(field, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        CanonicalField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }

    /// Values in column order, ready for a tabular row.
    #[must_use]
    pub fn to_row(&self) -> Vec<&str> {
        self.values.iter().map(String::as_str).collect()
    }
}

impl Default for PropertyRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for PropertyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CanonicalField::COUNT))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field.display_name(), value)?;
        }
        map.end()
    }
}

/// Ordered records of one business-type partition (e.g. "Sales").
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCollection {
    /// Section name, copied into each record's `Section` field
    pub name: String,
    /// Records in the order they were finalized
    pub records: Vec<PropertyRecord>,
}

impl SectionCollection {
    /// Empty collection for `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Append a finalized record.
    pub fn push(&mut self, record: PropertyRecord) {
        self.records.push(record);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lowercase file-name friendly form of the section name.
    ///
    /// `"Sales"` becomes `"sales"`, `"Venta Casas"` becomes `"venta-casas"`.
    #[must_use]
    pub fn slug(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        for ch in self.name.trim().chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
            } else if !slug.ends_with('-') && !slug.is_empty() {
                slug.push('-');
            }
        }
        let slug = slug.trim_end_matches('-').to_string();
        if slug.is_empty() {
            "section".to_string()
        } else {
            slug
        }
    }
}
