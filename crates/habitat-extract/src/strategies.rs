//! Individual extraction methods.
//!
//! Each method reads a parsed document and returns raw (uncleaned) values for
//! the fields it can find. Missing structure yields an empty map; no method
//! fails. Inside one method the first value found for a field is kept.

use crate::clean::clean;
use crate::dom::{element_text, next_sibling_named, static_selector};
use crate::normalize::{normalize, FieldNormalizer};
use habitat_core::{is_sentinel, CanonicalField, FieldMap};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// One way of locating field values in a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `<dt>label</dt><dd>value</dd>` pairs
    DefinitionList,
    /// Table rows whose first cell is the label and second cell the value
    Table,
    /// `<li>label: value</li>` items
    ListItem,
    /// Field patterns applied to descriptive text blocks
    FreeText,
    /// Spans whose class (or inner icon class) names the field
    IconSpan,
}

impl Strategy {
    /// Priority order; earlier strategies win on conflicting fields.
    pub const ORDER: [Strategy; 5] = [
        Strategy::DefinitionList,
        Strategy::Table,
        Strategy::ListItem,
        Strategy::FreeText,
        Strategy::IconSpan,
    ];

    /// Short name used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DefinitionList => "definition_list",
            Self::Table => "table",
            Self::ListItem => "list_item",
            Self::FreeText => "free_text",
            Self::IconSpan => "icon_span",
        }
    }

    /// Raw values this strategy finds in `document`.
    #[must_use]
    pub fn extract(self, document: &Html, normalizer: &FieldNormalizer) -> FieldMap {
        match self {
            Self::DefinitionList => definition_list(document, normalizer),
            Self::Table => table(document, normalizer),
            Self::ListItem => list_items(document, normalizer),
            Self::FreeText => free_text(document),
            Self::IconSpan => icon_spans(document),
        }
    }
}

static DT: Lazy<Selector> = Lazy::new(|| static_selector("dl dt"));
static TABLE_ROW: Lazy<Selector> = Lazy::new(|| static_selector("table tr"));
static TABLE_CELL: Lazy<Selector> = Lazy::new(|| static_selector("td, th"));
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| static_selector("ul li, ol li"));
static TEXT_BLOCK: Lazy<Selector> = Lazy::new(|| {
    static_selector("div.property-info, div.details, div.characteristics, div.features")
});
static SPAN: Lazy<Selector> = Lazy::new(|| static_selector("span"));
static ICON: Lazy<Selector> = Lazy::new(|| static_selector("i"));
/// Detail-page price selectors, most specific first.
static PRICE_PROBES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        ".price",
        ".precio",
        ".property-price",
        "[class*='price']",
        "[class*='precio']",
        ".value",
        ".cost",
        ".valor",
    ]
    .into_iter()
    .map(static_selector)
    .collect()
});

/// Store `value` under the label's field unless the field already has one.
fn record_labelled(fields: &mut FieldMap, normalizer: &FieldNormalizer, label: &str, value: &str) {
    let label = label.replace(':', "");
    let value = value.trim();
    if is_sentinel(value) {
        return;
    }
    if let Some(field) = normalizer.match_label(&label) {
        fields.entry(field).or_insert_with(|| value.to_string());
    }
}

fn definition_list(document: &Html, normalizer: &FieldNormalizer) -> FieldMap {
    let mut fields = FieldMap::new();
    for dt in document.select(&DT) {
        if let Some(dd) = next_sibling_named(&dt, "dd") {
            record_labelled(&mut fields, normalizer, &element_text(&dt), &element_text(&dd));
        }
    }
    fields
}

fn table(document: &Html, normalizer: &FieldNormalizer) -> FieldMap {
    let mut fields = FieldMap::new();
    for row in document.select(&TABLE_ROW) {
        let cells: Vec<ElementRef<'_>> = row.select(&TABLE_CELL).collect();
        if let [label, value, ..] = cells.as_slice() {
            record_labelled(&mut fields, normalizer, &element_text(label), &element_text(value));
        }
    }
    fields
}

fn list_items(document: &Html, normalizer: &FieldNormalizer) -> FieldMap {
    let mut fields = FieldMap::new();
    for item in document.select(&LIST_ITEM) {
        let text = element_text(&item);
        if let Some((label, value)) = text.split_once(':') {
            if !label.trim().is_empty() {
                record_labelled(&mut fields, normalizer, label, value);
            }
        }
    }
    fields
}

const AREA_NUMBER: &str = r"(\d+(?:[.,]\d+)*)\s*(?:m²|m2|mts?|metros)(?:\s+cuadrados)?";

/// Patterns over normalized block text, first capture group is the value.
static FREE_TEXT_PATTERNS: Lazy<Vec<(CanonicalField, Regex)>> = Lazy::new(|| {
    let patterns = [
        (
            CanonicalField::Bedrooms,
            r"(\d+)\s*(?:alcobas?|habitacion(?:es)?|dormitorios?|bedrooms?|beds?|hab)\b".to_string(),
        ),
        (
            CanonicalField::Bathrooms,
            r"(\d+)\s*(?:banos?|bathrooms?|baths?)\b".to_string(),
        ),
        (
            CanonicalField::Garage,
            r"(\d+)\s*(?:garajes?|garages?|parking|parqueaderos?)\b".to_string(),
        ),
        (
            CanonicalField::Stratum,
            r"(?:estrato|stratum)\s*:?\s*(\d+)".to_string(),
        ),
        (CanonicalField::Floor, r"(?:piso|floor)\s*:?\s*(\d+)".to_string()),
        (
            CanonicalField::BuiltArea,
            format!(r"{AREA_NUMBER}\s+(?:construid\w*|de construccion|area construida|built)"),
        ),
        (
            CanonicalField::LandArea,
            format!(r"{AREA_NUMBER}\s+(?:de\s+)?(?:terreno|lote|area terreno|land|lot)\b"),
        ),
    ];
    patterns
        .into_iter()
        .map(|(field, pattern)| {
            let regex = Regex::new(&pattern)
                .unwrap_or_else(|e| panic!("built-in pattern for {field} is invalid: {e}"));
            (field, regex)
        })
        .collect()
});

fn free_text(document: &Html) -> FieldMap {
    let mut fields = FieldMap::new();
    for block in document.select(&TEXT_BLOCK) {
        let text = normalize(&element_text(&block));
        for (field, regex) in FREE_TEXT_PATTERNS.iter() {
            if fields.contains_key(field) {
                continue;
            }
            if let Some(caps) = regex.captures(&text) {
                let value = match field {
                    CanonicalField::BuiltArea | CanonicalField::LandArea => {
                        format!("{} m²", &caps[1])
                    }
                    _ => caps[1].to_string(),
                };
                fields.insert(*field, value);
            }
        }
    }
    fields
}

/// Class-name segments that identify a field, checked in this order.
const ICON_CLASSES: &[(&str, CanonicalField)] = &[
    ("bed", CanonicalField::Bedrooms),
    ("beds", CanonicalField::Bedrooms),
    ("bedroom", CanonicalField::Bedrooms),
    ("bedrooms", CanonicalField::Bedrooms),
    ("alcoba", CanonicalField::Bedrooms),
    ("alcobas", CanonicalField::Bedrooms),
    ("habitaciones", CanonicalField::Bedrooms),
    ("bath", CanonicalField::Bathrooms),
    ("baths", CanonicalField::Bathrooms),
    ("bathroom", CanonicalField::Bathrooms),
    ("bathrooms", CanonicalField::Bathrooms),
    ("bano", CanonicalField::Bathrooms),
    ("banos", CanonicalField::Bathrooms),
    ("car", CanonicalField::Garage),
    ("cars", CanonicalField::Garage),
    ("garage", CanonicalField::Garage),
    ("parking", CanonicalField::Garage),
    ("garaje", CanonicalField::Garage),
    ("terrain", CanonicalField::LandArea),
    ("land", CanonicalField::LandArea),
    ("lot", CanonicalField::LandArea),
    ("terreno", CanonicalField::LandArea),
    ("area", CanonicalField::BuiltArea),
    ("built", CanonicalField::BuiltArea),
    ("construida", CanonicalField::BuiltArea),
];

fn icon_field(class_token: &str) -> Option<CanonicalField> {
    class_token
        .split(['-', '_'])
        .find_map(|segment| {
            let segment = segment.to_ascii_lowercase();
            ICON_CLASSES
                .iter()
                .find(|(name, _)| *name == segment)
                .map(|(_, field)| *field)
        })
}

fn icon_spans(document: &Html) -> FieldMap {
    let mut fields = FieldMap::new();
    for span in document.select(&SPAN) {
        let own = span.value().classes();
        let nested = span.select(&ICON).flat_map(|icon| icon.value().classes());
        let Some(field) = own.chain(nested).find_map(icon_field) else {
            continue;
        };
        let value = element_text(&span);
        if !is_sentinel(&value) {
            fields.entry(field).or_insert(value);
        }
    }
    fields
}

/// Price shown on a detail page, cleaned.
///
/// Selectors are tried in priority order; within one selector the first
/// element whose text contains a digit wins.
#[must_use]
pub fn probe_price(document: &Html) -> Option<String> {
    PRICE_PROBES
        .iter()
        .find_map(|selector| {
            document
                .select(selector)
                .map(|el| element_text(&el))
                .find(|text| has_digit(text))
        })
        .map(|text| clean(CanonicalField::Price, &text))
}

fn has_digit(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
}
