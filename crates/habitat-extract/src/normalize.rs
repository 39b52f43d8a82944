//! Label canonicalization and label → field matching.

use habitat_core::CanonicalField;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lowercase, trim, strip accents and collapse whitespace.
///
/// `"ÁREA   Construida"` and `"area construida"` both become `"area construida"`.
/// Total over any input; the empty string maps to the empty string.
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .trim()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Built-in Spanish and English label variants, in matching priority order.
const DEFAULT_LABELS: &[(&str, CanonicalField)] = &[
    ("país", CanonicalField::Country),
    ("pais", CanonicalField::Country),
    ("departamento", CanonicalField::State),
    ("ciudad", CanonicalField::City),
    ("localidad", CanonicalField::Locality),
    ("zona / barrio", CanonicalField::Neighborhood),
    ("zona", CanonicalField::Neighborhood),
    ("barrio", CanonicalField::Neighborhood),
    ("estado", CanonicalField::Status),
    ("área construida", CanonicalField::BuiltArea),
    ("area construida", CanonicalField::BuiltArea),
    ("área terreno", CanonicalField::LandArea),
    ("area terreno", CanonicalField::LandArea),
    ("alcobas", CanonicalField::Bedrooms),
    ("alcoba", CanonicalField::Bedrooms),
    ("habitación", CanonicalField::Bedrooms),
    ("habitaciones", CanonicalField::Bedrooms),
    ("baño", CanonicalField::Bathrooms),
    ("baños", CanonicalField::Bathrooms),
    ("bano", CanonicalField::Bathrooms),
    ("banos", CanonicalField::Bathrooms),
    ("garaje", CanonicalField::Garage),
    ("garajes", CanonicalField::Garage),
    ("estrato", CanonicalField::Stratum),
    ("piso", CanonicalField::Floor),
    ("año construcción", CanonicalField::YearBuilt),
    ("ano construccion", CanonicalField::YearBuilt),
    ("tipo de inmueble", CanonicalField::PropertyType),
    ("tipo de negocio", CanonicalField::BusinessType),
    ("valor administración", CanonicalField::AdministrationFee),
    ("valor administracion", CanonicalField::AdministrationFee),
    ("administración", CanonicalField::AdministrationFee),
    ("precio", CanonicalField::Price),
    ("valor", CanonicalField::Price),
    ("coste", CanonicalField::Price),
    ("country", CanonicalField::Country),
    ("city", CanonicalField::City),
    ("neighborhood", CanonicalField::Neighborhood),
    ("status", CanonicalField::Status),
    ("built area", CanonicalField::BuiltArea),
    ("floor area", CanonicalField::BuiltArea),
    ("land area", CanonicalField::LandArea),
    ("lot size", CanonicalField::LandArea),
    ("bedrooms", CanonicalField::Bedrooms),
    ("bathrooms", CanonicalField::Bathrooms),
    ("garage", CanonicalField::Garage),
    ("parking", CanonicalField::Garage),
    ("stratum", CanonicalField::Stratum),
    ("floor", CanonicalField::Floor),
    ("year built", CanonicalField::YearBuilt),
    ("property type", CanonicalField::PropertyType),
    ("business type", CanonicalField::BusinessType),
    ("administration fee", CanonicalField::AdministrationFee),
    ("price", CanonicalField::Price),
];

/// Caller-supplied label variant, as written in site definitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAlias {
    /// Label text as it appears on the page (any case, accents allowed)
    pub label: String,
    /// Field the label maps to
    pub field: CanonicalField,
}

/// Many-to-one relation from normalized label text to a canonical field.
///
/// Keys keep their insertion order, which is the priority order of the
/// substring fallback in [`FieldNormalizer::match_label`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMapping {
    entries: Vec<(String, CanonicalField)>,
}

impl LabelMapping {
    /// Mapping without any entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert `label` (normalized first).
    ///
    /// Re-inserting a key that normalizes to an existing one updates its field
    /// in place and keeps the original position. Blank labels are ignored.
    pub fn insert(&mut self, label: &str, field: CanonicalField) {
        let key = normalize(label);
        if key.is_empty() {
            return;
        }
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = field;
        } else {
            self.entries.push((key, field));
        }
    }

    /// Default mapping followed by `aliases`.
    #[must_use]
    pub fn with_aliases(aliases: &[LabelAlias]) -> Self {
        let mut mapping = Self::default();
        for alias in aliases {
            mapping.insert(&alias.label, alias.field);
        }
        mapping
    }

    /// Number of distinct normalized keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and fields in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CanonicalField)> {
        self.entries.iter().map(|(k, f)| (k.as_str(), *f))
    }
}

impl Default for LabelMapping {
    fn default() -> Self {
        let mut mapping = Self::empty();
        for (label, field) in DEFAULT_LABELS {
            mapping.insert(label, *field);
        }
        mapping
    }
}

impl<'a> FromIterator<(&'a str, CanonicalField)> for LabelMapping {
    fn from_iter<I: IntoIterator<Item = (&'a str, CanonicalField)>>(iter: I) -> Self {
        let mut mapping = Self::empty();
        for (label, field) in iter {
            mapping.insert(label, field);
        }
        mapping
    }
}

/// Resolves free-form labels to canonical fields.
///
/// Built once per run; immutable afterwards.
#[derive(Debug, Clone)]
pub struct FieldNormalizer {
    mapping: LabelMapping,
    exact: HashMap<String, CanonicalField>,
}

impl FieldNormalizer {
    /// Normalizer over `mapping`.
    #[must_use]
    pub fn new(mapping: LabelMapping) -> Self {
        let exact = mapping.iter().map(|(k, f)| (k.to_string(), f)).collect();
        Self { mapping, exact }
    }

    /// Mapping this normalizer resolves against.
    #[must_use]
    pub fn mapping(&self) -> &LabelMapping {
        &self.mapping
    }

    /// Field for `label`, if any.
    ///
    /// An exact match on the normalized label wins. Otherwise keys are scanned
    /// in insertion order and the first key that is contained in the label, or
    /// that contains the label, is returned. A label that normalizes to the
    /// empty string matches nothing.
    #[must_use]
    pub fn match_label(&self, label: &str) -> Option<CanonicalField> {
        let key = normalize(label);
        if key.is_empty() {
            return None;
        }
        if let Some(field) = self.exact.get(&key) {
            return Some(*field);
        }
        self.mapping
            .iter()
            .find(|(k, _)| key.contains(k) || k.contains(key.as_str()))
            .map(|(_, field)| field)
    }
}

impl Default for FieldNormalizer {
    fn default() -> Self {
        Self::new(LabelMapping::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accents_case_and_spaces() {
        assert_eq!(normalize("ÁREA Construida"), "area construida");
        assert_eq!(normalize("area   construida"), "area construida");
        assert_eq!(normalize("ÁREA Construida"), normalize("area   construida"));
        assert_eq!(normalize("  Año\tConstrucción\n"), "ano construccion");
        assert_eq!(normalize("Baños"), "banos");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_default_mapping_collapses_accent_variants() {
        let mapping = LabelMapping::default();
        let pais_keys = mapping.iter().filter(|(k, _)| *k == "pais").count();
        assert_eq!(pais_keys, 1);
        assert!(mapping.len() < DEFAULT_LABELS.len());
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut mapping: LabelMapping =
            [("zona", CanonicalField::Neighborhood), ("estado", CanonicalField::Status)]
                .into_iter()
                .collect();
        mapping.insert("ZONA", CanonicalField::Locality);
        let keys: Vec<_> = mapping.iter().collect();
        assert_eq!(
            keys,
            vec![("zona", CanonicalField::Locality), ("estado", CanonicalField::Status)]
        );
    }

    #[test]
    fn test_exact_match() {
        let normalizer = FieldNormalizer::default();
        assert_eq!(normalizer.match_label("Alcobas"), Some(CanonicalField::Bedrooms));
        assert_eq!(normalizer.match_label("BAÑOS"), Some(CanonicalField::Bathrooms));
        assert_eq!(
            normalizer.match_label("Valor administración"),
            Some(CanonicalField::AdministrationFee)
        );
        assert_eq!(normalizer.match_label("Bedrooms"), Some(CanonicalField::Bedrooms));
    }

    #[test]
    fn test_substring_match_label_contains_key() {
        let normalizer = FieldNormalizer::default();
        assert_eq!(
            normalizer.match_label("Área construida (m²)"),
            Some(CanonicalField::BuiltArea)
        );
        assert_eq!(
            normalizer.match_label("Estrato socioeconómico"),
            Some(CanonicalField::Stratum)
        );
    }

    #[test]
    fn test_substring_match_key_contains_label() {
        let normalizer = FieldNormalizer::default();
        // "localidad" contains "localid"
        assert_eq!(normalizer.match_label("Localid"), Some(CanonicalField::Locality));
    }

    #[test]
    fn test_first_declared_key_wins() {
        // Both "administracion" and "valor" are contained in the label;
        // "administracion" is declared first.
        let normalizer = FieldNormalizer::default();
        assert_eq!(
            normalizer.match_label("Valor de la administración"),
            Some(CanonicalField::AdministrationFee)
        );

        let custom: LabelMapping = [("valor", CanonicalField::Price), ("administracion", CanonicalField::AdministrationFee)]
            .into_iter()
            .collect();
        let normalizer = FieldNormalizer::new(custom);
        assert_eq!(
            normalizer.match_label("Valor de la administración"),
            Some(CanonicalField::Price)
        );
    }

    #[test]
    fn test_no_match() {
        let normalizer = FieldNormalizer::default();
        assert_eq!(normalizer.match_label("Piscina climatizada"), None);
        assert_eq!(normalizer.match_label(""), None);
        assert_eq!(normalizer.match_label("   "), None);
    }

    #[test]
    fn test_match_is_deterministic() {
        let normalizer = FieldNormalizer::default();
        for label in ["Ciudad", "Barrio / Zona", "xyz", "Tipo", "", "ba"] {
            let first = normalizer.match_label(label);
            for _ in 0..5 {
                assert_eq!(normalizer.match_label(label), first, "label {label:?}");
            }
        }
    }

    #[test]
    fn test_aliases_extend_defaults() {
        let mapping = LabelMapping::with_aliases(&[LabelAlias {
            label: "Parqueaderos".to_string(),
            field: CanonicalField::Garage,
        }]);
        let normalizer = FieldNormalizer::new(mapping);
        assert_eq!(normalizer.match_label("parqueaderos"), Some(CanonicalField::Garage));
        assert_eq!(normalizer.match_label("Ciudad"), Some(CanonicalField::City));
    }

    #[test]
    fn test_alias_deserializes_from_display_name() {
        let alias: LabelAlias =
            toml::from_str("label = \"Metros construidos\"\nfield = \"Built Area\"")
                .expect("parse alias");
        assert_eq!(alias.field, CanonicalField::BuiltArea);
    }
}
