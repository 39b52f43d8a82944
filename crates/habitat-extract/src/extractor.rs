//! Priority-ordered, non-destructive merge of the extraction strategies.

use crate::clean::clean;
use crate::normalize::FieldNormalizer;
use crate::strategies::{probe_price, Strategy};
use habitat_core::{is_sentinel, CanonicalField, FieldMap, PropertyRecord};
use scraper::Html;

/// Fields recovered from one detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Cleaned values, one per field, from the highest-priority strategy that found it
    pub fields: FieldMap,
    /// Cleaned price read from the page's price element, if it showed digits
    pub detail_price: Option<String>,
}

impl Extraction {
    /// Write this extraction into `record`.
    ///
    /// A detail-page price with digits replaces any listing price already on
    /// the record: the price element wins, then a labelled `Price` field.
    /// Every other field is only filled while the record still holds the sentinel.
    pub fn apply_to(&self, record: &mut PropertyRecord) -> usize {
        let mut changed = 0;
        if let Some(price) = self.page_price() {
            if record.overwrite(CanonicalField::Price, price) {
                changed += 1;
            }
        }
        changed + record.fill_all(&self.fields)
    }

    /// Price this page asserts, if any.
    #[must_use]
    pub fn page_price(&self) -> Option<&str> {
        self.detail_price.as_deref().or_else(|| {
            self.fields
                .get(&CanonicalField::Price)
                .map(String::as_str)
                .filter(|price| price.chars().any(|c| c.is_ascii_digit()))
        })
    }
}

/// Merge `partial` into `merged`, cleaning each accepted value.
///
/// Fields already present in `merged` are left alone, as are values that clean
/// to the sentinel. Returns the number of fields added.
pub fn merge_partial(merged: &mut FieldMap, partial: FieldMap) -> usize {
    let mut added = 0;
    for (field, raw) in partial {
        if merged.contains_key(&field) {
            continue;
        }
        let value = clean(field, &raw);
        if is_sentinel(&value) {
            continue;
        }
        merged.insert(field, value);
        added += 1;
    }
    added
}

/// Runs every [`Strategy`] in priority order over a document.
#[derive(Debug, Clone, Default)]
pub struct MultiStrategyExtractor {
    normalizer: FieldNormalizer,
}

impl MultiStrategyExtractor {
    /// Extractor resolving labels with `normalizer`.
    #[must_use]
    pub fn new(normalizer: FieldNormalizer) -> Self {
        Self { normalizer }
    }

    /// Label resolver in use.
    #[must_use]
    pub fn normalizer(&self) -> &FieldNormalizer {
        &self.normalizer
    }

    /// Parse `html` and extract from it.
    #[must_use]
    pub fn extract_html(&self, html: &str) -> Extraction {
        self.extract(&Html::parse_document(html))
    }

    /// Extract every recoverable field from `document`.
    #[must_use]
    pub fn extract(&self, document: &Html) -> Extraction {
        let mut fields = FieldMap::new();
        for strategy in Strategy::ORDER {
            let partial = strategy.extract(document, &self.normalizer);
            let found = partial.len();
            let added = merge_partial(&mut fields, partial);
            tracing::trace!(strategy = strategy.name(), found, added, "strategy finished");
        }

        let detail_price = probe_price(document);
        tracing::debug!(
            fields = fields.len(),
            detail_price = detail_price.is_some(),
            "detail page extracted"
        );

        Extraction {
            fields,
            detail_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitat_core::SENTINEL;

    #[test]
    fn test_merge_keeps_first_value() {
        let mut merged = FieldMap::new();
        merge_partial(
            &mut merged,
            FieldMap::from([(CanonicalField::Bedrooms, "3".to_string())]),
        );
        let added = merge_partial(
            &mut merged,
            FieldMap::from([
                (CanonicalField::Bedrooms, "5".to_string()),
                (CanonicalField::Bathrooms, "2 baños".to_string()),
            ]),
        );
        assert_eq!(added, 1);
        assert_eq!(merged[&CanonicalField::Bedrooms], "3");
        assert_eq!(merged[&CanonicalField::Bathrooms], "2");
    }

    #[test]
    fn test_merge_skips_sentinel_values() {
        let mut merged = FieldMap::new();
        let added = merge_partial(
            &mut merged,
            FieldMap::from([(CanonicalField::City, SENTINEL.to_string())]),
        );
        assert_eq!(added, 0);
        assert!(merged.is_empty());

        // A later strategy can still supply the field.
        merge_partial(
            &mut merged,
            FieldMap::from([(CanonicalField::City, "Medellín".to_string())]),
        );
        assert_eq!(merged[&CanonicalField::City], "Medellín");
    }

    #[test]
    fn test_earlier_strategy_wins_across_structures() {
        let html = r#"
            <dl><dt>Alcobas</dt><dd>3</dd></dl>
            <table><tr><td>Habitaciones</td><td>5</td></tr></table>
            <span class="icon-bed">6</span>
        "#;
        let extraction = MultiStrategyExtractor::default().extract_html(html);
        assert_eq!(extraction.fields[&CanonicalField::Bedrooms], "3");
    }

    #[test]
    fn test_later_strategy_fills_gaps() {
        let html = r#"
            <dl><dt>Alcobas</dt><dd>3</dd></dl>
            <ul><li>Baños: 2</li></ul>
            <div class="features">Parqueadero cubierto, 1 garaje</div>
        "#;
        let extraction = MultiStrategyExtractor::default().extract_html(html);
        assert_eq!(extraction.fields[&CanonicalField::Bedrooms], "3");
        assert_eq!(extraction.fields[&CanonicalField::Bathrooms], "2");
        assert_eq!(extraction.fields[&CanonicalField::Garage], "1");
    }

    #[test]
    fn test_values_are_cleaned() {
        let html = r#"<table>
            <tr><td>Área construida</td><td>120,5 m²</td></tr>
            <tr><td>Año construcción</td><td>Construido en 1998, remodelado en 2010</td></tr>
        </table>"#;
        let extraction = MultiStrategyExtractor::default().extract_html(html);
        assert_eq!(extraction.fields[&CanonicalField::BuiltArea], "120.5 m²");
        assert_eq!(extraction.fields[&CanonicalField::YearBuilt], "1998");
    }

    #[test]
    fn test_apply_to_preserves_listing_data() {
        let mut record = PropertyRecord::for_listing("Sales", "https://x.test/1", "Casa");
        record.overwrite(CanonicalField::Price, "$300.000.000");

        let extraction = Extraction {
            fields: FieldMap::from([
                (CanonicalField::Title, "Otro título".to_string()),
                (CanonicalField::Bedrooms, "4".to_string()),
            ]),
            detail_price: None,
        };
        extraction.apply_to(&mut record);

        assert_eq!(record.get(CanonicalField::Title), "Casa");
        assert_eq!(record.get(CanonicalField::Bedrooms), "4");
        assert_eq!(record.get(CanonicalField::Price), "$300.000.000");
    }

    #[test]
    fn test_detail_price_replaces_listing_price() {
        let mut record = PropertyRecord::for_listing("Sales", "https://x.test/1", "Casa");
        record.overwrite(CanonicalField::Price, "$300.000.000");

        let extraction =
            MultiStrategyExtractor::default().extract_html(r#"<p class="price">$ 310.000.000</p>"#);
        extraction.apply_to(&mut record);

        assert_eq!(record.get(CanonicalField::Price), "$310.000.000");
    }

    #[test]
    fn test_labelled_detail_price_replaces_listing_price() {
        let mut record = PropertyRecord::for_listing("Sales", "https://x.test/1", "Casa");
        record.overwrite(CanonicalField::Price, "$450.000.000");

        let extraction = MultiStrategyExtractor::default()
            .extract_html("<table><tr><td>Precio</td><td>$500.000.000</td></tr></table>");
        assert_eq!(extraction.detail_price, None);
        extraction.apply_to(&mut record);

        assert_eq!(record.get(CanonicalField::Price), "$500.000.000");
    }

    #[test]
    fn test_labelled_price_without_digits_keeps_listing_price() {
        let mut record = PropertyRecord::for_listing("Sales", "https://x.test/1", "Casa");
        record.overwrite(CanonicalField::Price, "$450.000.000");

        let extraction = MultiStrategyExtractor::default()
            .extract_html("<dl><dt>Precio</dt><dd>A convenir</dd></dl>");
        assert_eq!(extraction.page_price(), None);
        extraction.apply_to(&mut record);

        assert_eq!(record.get(CanonicalField::Price), "$450.000.000");
    }

    #[test]
    fn test_empty_page() {
        let extraction = MultiStrategyExtractor::default().extract_html("<html><body></body></html>");
        assert_eq!(extraction, Extraction::default());
    }
}
