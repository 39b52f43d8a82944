use habitat_browser::{BrowserError, PageFetcher};
use habitat_core::{CanonicalField, ScrapingConfig, SiteId, SENTINEL};
use habitat_extract::ListingSelectors;
use habitat_scanner::{BatchExporter, ScanError, ScrapeOrchestrator, SelectorSite};
use habitat_site::{SectionDefinition, SiteDefinition, SiteMetadata};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

const SALES_PAGE: &str = "https://listings.test/venta?page=";
const RENTALS_PAGE: &str = "https://listings.test/arriendo?page=";

/// Serves canned pages; unknown URLs time out, `fatal_url` kills the session.
#[derive(Default)]
struct FakeFetcher {
    pages: HashMap<String, String>,
    fatal_url: Option<String>,
    calls: Mutex<Vec<String>>,
    snapshot: Option<(String, PathBuf)>,
    snapshot_rows: Mutex<Option<usize>>,
}

impl FakeFetcher {
    fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    fn fatal_on(mut self, url: &str) -> Self {
        self.fatal_url = Some(url.to_string());
        self
    }

    /// Count the rows of `csv` on disk when `url` is requested.
    fn snapshot_on(mut self, url: &str, csv: &Path) -> Self {
        self.snapshot = Some((url.to_string(), csv.to_path_buf()));
        self
    }

    fn snapshot_rows(&self) -> Option<usize> {
        *self.snapshot_rows.lock().expect("snapshot lock")
    }

    fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .iter()
            .filter(|u| *u == url)
            .count()
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(
        &self,
        url: &str,
        readiness_marker: &str,
        _timeout: Duration,
    ) -> habitat_browser::Result<String> {
        self.calls.lock().expect("calls lock").push(url.to_string());
        if let Some((trigger, csv)) = &self.snapshot {
            if trigger == url && csv.exists() {
                *self.snapshot_rows.lock().expect("snapshot lock") = Some(read_rows(csv).len());
            }
        }
        if self.fatal_url.as_deref() == Some(url) {
            return Err(BrowserError::SessionClosed("CDP handler is no longer running".to_string()));
        }
        self.pages.get(url).cloned().ok_or_else(|| {
            BrowserError::Timeout(format!("'{readiness_marker}' not present on {url}"))
        })
    }
}

fn listing(items: &[(&str, &str, &str)]) -> String {
    let cards: String = items
        .iter()
        .map(|(href, title, price)| {
            format!(
                r#"<div class="property-item"><a href="{href}"><h3>{title}</h3></a><span class="price">{price}</span></div>"#
            )
        })
        .collect();
    format!("<html><body>{cards}</body></html>")
}

const EMPTY_LISTING: &str = "<html><body><p>No hay resultados</p></body></html>";

fn detail_url(id: u32) -> String {
    format!("https://listings.test/inmueble/{id}")
}

fn definition(sections: Vec<SectionDefinition>) -> SiteDefinition {
    SiteDefinition {
        site: SiteMetadata {
            id: SiteId::new("test-site").expect("valid site ID"),
            name: "Test Site".to_string(),
            base_url: "https://listings.test".to_string(),
            detail_readiness_marker: None,
        },
        sections,
        listing: ListingSelectors::default(),
        labels: Vec::new(),
    }
}

fn sales_only() -> SiteDefinition {
    definition(vec![SectionDefinition::new("Sales", format!("{SALES_PAGE}1"))])
}

fn config(max_pages: u32) -> ScrapingConfig {
    ScrapingConfig {
        max_pages,
        save_every: 0,
        ..ScrapingConfig::default().without_delays()
    }
}

fn orchestrator(
    site: SiteDefinition,
    fetcher: Arc<FakeFetcher>,
    config: ScrapingConfig,
    out: &Path,
) -> ScrapeOrchestrator<SelectorSite<Arc<FakeFetcher>>> {
    let site = SelectorSite::new(site, fetcher, &config).expect("build site adapter");
    ScrapeOrchestrator::new(site, config, BatchExporter::new(out, false))
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).expect("open csv");
    reader.records().map(|r| r.expect("csv row")).collect()
}

#[tokio::test]
async fn test_duplicate_url_across_pages_is_fetched_once() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(
                &format!("{SALES_PAGE}1"),
                &listing(&[
                    ("/inmueble/1", "Casa uno", "$350.000.000 COP"),
                    ("/inmueble/2", "Casa dos", "$420.000.000"),
                ]),
            )
            .page(
                &format!("{SALES_PAGE}2"),
                &listing(&[
                    ("/inmueble/2", "Casa dos otra vez", "$1"),
                    ("/inmueble/3", "Casa tres", "$500.000.000"),
                ]),
            )
            .page(&format!("{SALES_PAGE}3"), EMPTY_LISTING)
            .page(&detail_url(1), "<dl><dt>Alcobas</dt><dd>3</dd></dl>")
            .page(&detail_url(2), "<dl><dt>Alcobas</dt><dd>2</dd></dl>")
            .page(&detail_url(3), "<dl><dt>Alcobas</dt><dd>4</dd></dl>"),
    );
    let tmp = TempDir::new().expect("create temp dir");

    let summary = orchestrator(sales_only(), fetcher.clone(), config(5), tmp.path())
        .run()
        .await
        .expect("run");

    assert_eq!(fetcher.calls_to(&detail_url(2)), 1);
    assert_eq!(fetcher.calls_to(&format!("{SALES_PAGE}4")), 0);

    let stats = &summary.sections[0];
    assert_eq!(stats.pages, 3);
    assert_eq!(stats.candidates, 4);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.records, 3);
    assert_eq!(stats.failures, 0);

    let rows = read_rows(&tmp.path().join("properties_sales.csv"));
    let urls: Vec<&str> = rows.iter().map(|r| &r[19]).collect();
    assert_eq!(urls, vec![detail_url(1), detail_url(2), detail_url(3)]);
    // the first sighting of a URL owns its record
    assert_eq!(&rows[1][18], "Casa dos");
    assert_eq!(&rows[0][17], "$350.000.000");
    assert_eq!(&rows[0][8], "3");
}

#[tokio::test]
async fn test_detail_failure_keeps_listing_data() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(
                &format!("{SALES_PAGE}1"),
                &listing(&[("/inmueble/9", "Lote en La Calera", "$350.000.000 COP")]),
            ),
    );
    let tmp = TempDir::new().expect("create temp dir");

    let summary = orchestrator(sales_only(), fetcher.clone(), config(1), tmp.path())
        .run()
        .await
        .expect("run");

    assert_eq!(fetcher.calls_to(&detail_url(9)), 3);
    assert_eq!(summary.total_failures(), 1);

    let mut reader =
        csv::Reader::from_path(tmp.path().join("properties_sales.csv")).expect("open csv");
    let headers = reader.headers().expect("headers").clone();
    let row = reader.records().next().expect("one row").expect("csv row");
    for (name, value) in headers.iter().zip(row.iter()) {
        let field = CanonicalField::from_display_name(name).expect("known column");
        match field {
            CanonicalField::Title => assert_eq!(value, "Lote en La Calera"),
            CanonicalField::Price => assert_eq!(value, "$350.000.000"),
            CanonicalField::Url => assert_eq!(value, detail_url(9)),
            CanonicalField::Section => assert_eq!(value, "Sales"),
            CanonicalField::Error => {
                assert_ne!(value, SENTINEL);
                assert!(value.contains("after 3 attempts"), "{value}");
            }
            CanonicalField::ExtractionDate => assert_ne!(value, SENTINEL),
            _ => assert_eq!(value, SENTINEL, "{name}"),
        }
    }
}

#[tokio::test]
async fn test_empty_first_page_ends_section() {
    let fetcher = Arc::new(FakeFetcher::default().page(&format!("{SALES_PAGE}1"), EMPTY_LISTING));
    let tmp = TempDir::new().expect("create temp dir");

    let summary = orchestrator(sales_only(), fetcher.clone(), config(10), tmp.path())
        .run()
        .await
        .expect("run");

    assert_eq!(summary.sections[0].pages, 1);
    assert_eq!(summary.total_records(), 0);
    assert_eq!(fetcher.calls_to(&format!("{SALES_PAGE}2")), 0);
    assert!(read_rows(&tmp.path().join("properties_sales.csv")).is_empty());
    assert!(tmp.path().join("properties_all.json").exists());
}

#[tokio::test]
async fn test_page_limit_and_listing_failure_end_sections() {
    let site = definition(vec![
        SectionDefinition::new("Sales", format!("{SALES_PAGE}1")),
        SectionDefinition::new("Rentals", format!("{RENTALS_PAGE}1")),
    ]);
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(&format!("{SALES_PAGE}1"), &listing(&[("/inmueble/1", "Casa uno", "")]))
            .page(&format!("{SALES_PAGE}2"), &listing(&[("/inmueble/2", "Casa dos", "")]))
            .page(&detail_url(1), "<html><body></body></html>")
            .page(&detail_url(2), "<html><body></body></html>"),
    );
    let tmp = TempDir::new().expect("create temp dir");

    // Rentals page 1 is missing: the section ends, the run does not
    let summary = orchestrator(site, fetcher.clone(), config(1), tmp.path())
        .run()
        .await
        .expect("run");

    assert_eq!(fetcher.calls_to(&format!("{SALES_PAGE}2")), 0);
    assert_eq!(fetcher.calls_to(&format!("{RENTALS_PAGE}1")), 3);

    let sales = &summary.sections[0];
    assert_eq!((sales.name.as_str(), sales.records), ("Sales", 1));
    let rentals = &summary.sections[1];
    assert!(rentals.listing_failed);
    assert_eq!(rentals.records, 0);

    assert_eq!(read_rows(&tmp.path().join("properties_sales.csv")).len(), 1);
    assert!(read_rows(&tmp.path().join("properties_rentals.csv")).is_empty());
    assert_eq!(read_rows(&tmp.path().join("properties_all.csv")).len(), 1);
}

#[tokio::test]
async fn test_fatal_error_flushes_partial_data_then_propagates() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(
                &format!("{SALES_PAGE}1"),
                &listing(&[
                    ("/inmueble/1", "Casa uno", "$100"),
                    ("/inmueble/2", "Casa dos", "$200"),
                    ("/inmueble/3", "Casa tres", "$300"),
                ]),
            )
            .page(&detail_url(1), "<dl><dt>Ciudad</dt><dd>Bogotá</dd></dl>")
            .fatal_on(&detail_url(2)),
    );
    let tmp = TempDir::new().expect("create temp dir");

    let err = orchestrator(sales_only(), fetcher.clone(), config(1), tmp.path())
        .run()
        .await
        .unwrap_err();

    assert!(err.is_fatal());
    assert!(matches!(err, ScanError::Browser(BrowserError::SessionClosed(_))));
    assert_eq!(fetcher.calls_to(&detail_url(2)), 1);
    assert_eq!(fetcher.calls_to(&detail_url(3)), 0);

    let rows = read_rows(&tmp.path().join("properties_all.csv"));
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][2], "Bogotá");
}

#[tokio::test]
async fn test_failed_partial_export_keeps_original_error() {
    let fetcher = Arc::new(
        FakeFetcher::default()
            .page(
                &format!("{SALES_PAGE}1"),
                &listing(&[("/inmueble/1", "Casa uno", "$100")]),
            )
            .fatal_on(&detail_url(1)),
    );
    let tmp = TempDir::new().expect("create temp dir");
    let blocked = tmp.path().join("not-a-dir");
    std::fs::write(&blocked, "occupied").expect("write blocking file");

    let err = orchestrator(sales_only(), fetcher, config(1), &blocked)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Browser(BrowserError::SessionClosed(_))), "{err}");
    assert!(blocked.is_file());
}

#[tokio::test]
async fn test_periodic_save() {
    for (save_every, expected) in [(2, Some(2)), (0, None)] {
        let tmp = TempDir::new().expect("create temp dir");
        let sales_csv = tmp.path().join("properties_sales.csv");
        let fetcher = Arc::new(
            FakeFetcher::default()
                .page(
                    &format!("{SALES_PAGE}1"),
                    &listing(&[
                        ("/inmueble/1", "Casa uno", ""),
                        ("/inmueble/2", "Casa dos", ""),
                        ("/inmueble/3", "Casa tres", ""),
                    ]),
                )
                .page(&detail_url(1), "<html></html>")
                .page(&detail_url(2), "<html></html>")
                .page(&detail_url(3), "<html></html>")
                .snapshot_on(&detail_url(3), &sales_csv),
        );
        let config = ScrapingConfig {
            save_every,
            ..config(1)
        };

        orchestrator(sales_only(), fetcher.clone(), config, tmp.path())
            .run()
            .await
            .expect("run");

        assert_eq!(fetcher.snapshot_rows(), expected, "save_every = {save_every}");
        assert_eq!(read_rows(&sales_csv).len(), 3);
    }
}
