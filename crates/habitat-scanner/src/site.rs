//! Per-site capability contract consumed by the orchestrator.

use crate::error::{Result, ScanError};
use crate::fetcher::RetryingDetailFetcher;
use crate::url_builder::build_page_url;
use async_trait::async_trait;
use habitat_browser::PageFetcher;
use habitat_core::ScrapingConfig;
use habitat_extract::{Extraction, ListingCandidate, ListingParser, MultiStrategyExtractor};
use habitat_site::{SectionDefinition, SiteDefinition};
use url::Url;

/// What the orchestrator needs from a target site.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    /// Sections to scrape, in order.
    fn sections(&self) -> &[SectionDefinition];

    /// Detail candidates on listing page `page` (1-based) of `section`.
    ///
    /// A page that cannot be loaded is reported as [`ScanError::ListingLoad`].
    async fn fetch_listing(
        &self,
        section: &SectionDefinition,
        page: u32,
    ) -> Result<Vec<ListingCandidate>>;

    /// Markup of a detail page.
    ///
    /// A page that cannot be loaded is reported as [`ScanError::PageLoad`].
    async fn fetch_detail(&self, url: &str) -> Result<String>;

    /// Fields recovered from detail page markup.
    fn extract(&self, html: &str) -> Extraction;
}

/// [`SiteAdapter`] driven by a TOML [`SiteDefinition`].
pub struct SelectorSite<F> {
    definition: SiteDefinition,
    listing_parser: ListingParser,
    extractor: MultiStrategyExtractor,
    fetcher: RetryingDetailFetcher<F>,
    listing_marker: String,
    detail_marker: String,
}

impl<F: PageFetcher> SelectorSite<F> {
    /// Build the adapter; fails when the definition's selectors do not compile.
    pub fn new(definition: SiteDefinition, fetcher: F, config: &ScrapingConfig) -> Result<Self> {
        let listing_parser = definition.listing_parser()?;
        let extractor = MultiStrategyExtractor::new(definition.field_normalizer());
        let detail_marker = definition
            .detail_readiness_marker(&config.readiness_marker)
            .to_string();

        Ok(Self {
            listing_parser,
            extractor,
            fetcher: RetryingDetailFetcher::new(fetcher, config),
            listing_marker: config.readiness_marker.clone(),
            detail_marker,
            definition,
        })
    }

    /// Definition this adapter was built from.
    pub fn definition(&self) -> &SiteDefinition {
        &self.definition
    }
}

#[async_trait]
impl<F: PageFetcher> SiteAdapter for SelectorSite<F> {
    fn sections(&self) -> &[SectionDefinition] {
        &self.definition.sections
    }

    async fn fetch_listing(
        &self,
        section: &SectionDefinition,
        page: u32,
    ) -> Result<Vec<ListingCandidate>> {
        let page_url = build_page_url(&section.url_template, page)?;
        let base = Url::parse(&page_url).map_err(|e| ScanError::InvalidPageUrl {
            template: section.url_template.clone(),
            page,
            reason: e.to_string(),
        })?;

        tracing::info!(section = %section.name, page, url = %page_url, "loading listing page");
        let html = self
            .fetcher
            .fetch(&page_url, &self.listing_marker)
            .await
            .map_err(ScanError::into_listing_failure)?;

        Ok(self.listing_parser.parse(&html, &base))
    }

    async fn fetch_detail(&self, url: &str) -> Result<String> {
        self.fetcher.fetch(url, &self.detail_marker).await
    }

    fn extract(&self, html: &str) -> Extraction {
        self.extractor.extract_html(html)
    }
}
