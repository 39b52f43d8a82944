//! Per-field value canonicalization.
//!
//! Cleaning never fails: when a field's pattern does not match, the trimmed
//! input is kept as-is.

use habitat_core::{is_sentinel, CanonicalField, SENTINEL};
use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$?\s*(\d+(?:[.,]\d+)*)").expect("valid price regex"));

static AREA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)*)\s*(?:m²|m2|mts?²|mts?2|mts\b|metros)")
        .expect("valid area regex")
});

static YEAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year regex"));

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// Canonical form of `raw` for `field`.
///
/// Blank input and the sentinel come back as the sentinel.
///
/// | field | output |
/// |-------|--------|
/// | Price | `"$"` + first digit run with its separators |
/// | Built Area, Land Area | `"<number> m²"`, decimal comma turned into a dot |
/// | Year Built | first 4-digit year starting with 19 or 20 |
/// | Bedrooms, Bathrooms, Garage, Stratum, Floor | first integer |
/// | anything else | trimmed input |
#[must_use]
pub fn clean(field: CanonicalField, raw: &str) -> String {
    if is_sentinel(raw) {
        return SENTINEL.to_string();
    }
    let value = raw.trim();

    let cleaned = match field {
        CanonicalField::Price => PRICE_REGEX
            .captures(value)
            .map(|caps| format!("${}", &caps[1])),
        CanonicalField::BuiltArea | CanonicalField::LandArea => AREA_REGEX
            .captures(value)
            .map(|caps| format!("{} m²", decimal_number(&caps[1]))),
        CanonicalField::YearBuilt => YEAR_REGEX.find(value).map(|m| m.as_str().to_string()),
        CanonicalField::Bedrooms
        | CanonicalField::Bathrooms
        | CanonicalField::Garage
        | CanonicalField::Stratum
        | CanonicalField::Floor => INTEGER_REGEX.find(value).map(|m| m.as_str().to_string()),
        _ => None,
    };

    cleaned.unwrap_or_else(|| value.to_string())
}

/// `"1.200,5"` → `"1200.5"`, `"120,5"` → `"120.5"`.
///
/// Without a comma the token is returned unchanged, so `"1.200"` stays as written.
fn decimal_number(token: &str) -> String {
    if token.contains(',') {
        token.replace('.', "").replace(',', ".")
    } else {
        token.to_string()
    }
}
