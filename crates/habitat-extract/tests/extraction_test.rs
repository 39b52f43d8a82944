//! Extraction over whole detail pages.

use habitat_core::{CanonicalField, PropertyRecord, SENTINEL};
use habitat_extract::{
    clean, FieldNormalizer, LabelAlias, LabelMapping, ListingParser, MultiStrategyExtractor,
};

const MIXED_TEMPLATE: &str = r#"
<!DOCTYPE html>
<html>
<head><title>Apartamento en venta</title></head>
<body>
  <h1>Apartamento en venta, Chicó Navarra</h1>
  <div class="precio-box"><span class="precio">$ 780.000.000</span></div>
  <dl class="ficha">
    <dt>País:</dt><dd>Colombia</dd>
    <dt>Ciudad:</dt><dd>Bogotá D.C.</dd>
    <dt>Zona / Barrio:</dt><dd>Chicó Navarra</dd>
    <dt>Alcobas:</dt><dd>3</dd>
  </dl>
  <table class="caracteristicas">
    <tr><td>Habitaciones</td><td>4</td></tr>
    <tr><td>Área construida</td><td>142,5 m²</td></tr>
    <tr><td>Estrato</td><td>Estrato 6</td></tr>
  </table>
  <ul>
    <li>Año construcción: Construido en 1998, remodelado en 2010</li>
    <li>Tipo de inmueble: Apartamento</li>
    <li>Valor administración: $ 1.200.000</li>
  </ul>
  <div class="details">Cuenta con 2 baños, 2 garajes y 300 m2 de terreno comunal.</div>
  <span class="icon-bed">9</span>
  <span class="icon-bath">7</span>
</body>
</html>
"#;

#[test]
fn test_single_definition_list_fills_only_bedrooms() {
    let extraction =
        MultiStrategyExtractor::default().extract_html("<dl><dt>Alcobas</dt><dd>3</dd></dl>");

    let mut record = PropertyRecord::new();
    extraction.apply_to(&mut record);

    assert_eq!(record.get(CanonicalField::Bedrooms), "3");
    for field in CanonicalField::ALL {
        if field != CanonicalField::Bedrooms {
            assert_eq!(record.get(field), SENTINEL, "{field} should be unset");
        }
    }
}

#[test]
fn test_listing_price_is_cleaned() {
    assert_eq!(clean(CanonicalField::Price, "$350.000.000 COP"), "$350.000.000");
}

#[test]
fn test_mixed_template_page() {
    let extraction = MultiStrategyExtractor::default().extract_html(MIXED_TEMPLATE);
    let mut record = PropertyRecord::for_listing("Sales", "https://example.test/inmueble/1", "Apto");
    record.overwrite(CanonicalField::Price, &clean(CanonicalField::Price, "$750.000.000"));
    extraction.apply_to(&mut record);

    let expect = [
        (CanonicalField::Country, "Colombia"),
        (CanonicalField::City, "Bogotá D.C."),
        (CanonicalField::Neighborhood, "Chicó Navarra"),
        // definition list outranks the table and the icon span
        (CanonicalField::Bedrooms, "3"),
        (CanonicalField::BuiltArea, "142.5 m²"),
        (CanonicalField::Stratum, "6"),
        (CanonicalField::YearBuilt, "1998"),
        (CanonicalField::PropertyType, "Apartamento"),
        (CanonicalField::AdministrationFee, "$ 1.200.000"),
        // list and free text outrank the icon span
        (CanonicalField::Bathrooms, "2"),
        (CanonicalField::Garage, "2"),
        (CanonicalField::LandArea, "300 m²"),
        (CanonicalField::Price, "$780.000.000"),
        (CanonicalField::Title, "Apto"),
        (CanonicalField::Section, "Sales"),
    ];
    for (field, value) in expect {
        assert_eq!(record.get(field), value, "{field}");
    }
    assert_eq!(record.get(CanonicalField::Floor), SENTINEL);
    assert_eq!(record.error(), None);
}

#[test]
fn test_extraction_is_deterministic() {
    let extractor = MultiStrategyExtractor::default();
    let first = extractor.extract_html(MIXED_TEMPLATE);
    for _ in 0..3 {
        assert_eq!(extractor.extract_html(MIXED_TEMPLATE), first);
    }
}

#[test]
fn test_site_alias_extends_matching() {
    let html = "<table><tr><td>Parqueaderos</td><td>3</td></tr></table>";
    assert!(MultiStrategyExtractor::default()
        .extract_html(html)
        .fields
        .get(&CanonicalField::Garage)
        .is_none());

    let mapping = LabelMapping::with_aliases(&[LabelAlias {
        label: "Parqueaderos".to_string(),
        field: CanonicalField::Garage,
    }]);
    let extractor = MultiStrategyExtractor::new(FieldNormalizer::new(mapping));
    assert_eq!(
        extractor.extract_html(html).fields.get(&CanonicalField::Garage).map(String::as_str),
        Some("3")
    );
}

#[test]
fn test_listing_to_record() {
    let html = r#"
        <div class="listing-item">
          <a href="/inmueble/55"><h2>Casa en Cedritos</h2></a>
          <p class="price">$350.000.000 COP</p>
        </div>
    "#;
    let page = url::Url::parse("https://example.test/venta?page=1").unwrap();
    let candidates = ListingParser::default().parse(html, &page);
    assert_eq!(candidates.len(), 1);

    let candidate = &candidates[0];
    let mut record = PropertyRecord::for_listing("Sales", &candidate.url, &candidate.title);
    record.overwrite(
        CanonicalField::Price,
        &clean(CanonicalField::Price, candidate.price.as_deref().unwrap_or_default()),
    );
    assert_eq!(record.url(), "https://example.test/inmueble/55");
    assert_eq!(record.get(CanonicalField::Title), "Casa en Cedritos");
    assert_eq!(record.get(CanonicalField::Price), "$350.000.000");
}
