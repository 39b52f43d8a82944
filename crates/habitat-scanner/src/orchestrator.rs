//! Scrape orchestrator for one site.
//!
//! This module provides the `ScrapeOrchestrator`, which walks every section of
//! a site page by page, turns each newly seen listing into a record, and keeps
//! the collections on disk through periodic and final exports.

use crate::dedup::Deduplicator;
use crate::error::Result;
use crate::export::{BatchExporter, ExportReport};
use crate::site::SiteAdapter;
use habitat_core::{CanonicalField, PropertyRecord, ScrapingConfig, SectionCollection};
use habitat_extract::{clean, ListingCandidate};
use habitat_site::SectionDefinition;

/// Counters for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionStats {
    /// Section name
    pub name: String,
    /// Listing pages loaded
    pub pages: u32,
    /// Candidates found on those pages
    pub candidates: usize,
    /// Candidates skipped because their URL was already recorded
    pub duplicates: usize,
    /// Records appended to the section
    pub records: usize,
    /// Records whose detail page could not be loaded
    pub failures: usize,
    /// Whether the section ended on a listing page that failed to load
    pub listing_failed: bool,
}

impl SectionStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Per-section counters, in run order
    pub sections: Vec<SectionStats>,
    /// Final export
    pub export: ExportReport,
}

impl RunSummary {
    /// Records across all sections.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.sections.iter().map(|s| s.records).sum()
    }

    /// Page-load failures across all sections.
    #[must_use]
    pub fn total_failures(&self) -> usize {
        self.sections.iter().map(|s| s.failures).sum()
    }
}

/// Mutable state of one run.
struct RunState {
    dedup: Deduplicator,
    collections: Vec<SectionCollection>,
    admitted: usize,
    stats: Vec<SectionStats>,
}

/// Drives a [`SiteAdapter`] through every section and exports the result.
///
/// Work is strictly sequential: one page load, one extraction, one record at
/// a time.
pub struct ScrapeOrchestrator<S> {
    site: S,
    config: ScrapingConfig,
    exporter: BatchExporter,
}

impl<S: SiteAdapter> ScrapeOrchestrator<S> {
    /// Create a new orchestrator.
    #[must_use]
    pub fn new(site: S, config: ScrapingConfig, exporter: BatchExporter) -> Self {
        Self {
            site,
            config,
            exporter,
        }
    }

    /// Scrape every section and export the collections.
    ///
    /// # Errors
    /// A fatal error aborts the run. The collections gathered so far are
    /// exported first; if that export fails too, its error is logged and the
    /// original error is returned.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut state = RunState {
            dedup: Deduplicator::new(),
            collections: self
                .site
                .sections()
                .iter()
                .map(|s| SectionCollection::new(s.name.clone()))
                .collect(),
            admitted: 0,
            stats: Vec::new(),
        };

        if let Err(e) = self.scrape_sections(&mut state).await {
            tracing::error!(
                error = %e,
                records = state.admitted,
                "fatal error, saving partial data"
            );
            if let Err(flush_error) = self.exporter.export_all(&state.collections) {
                tracing::warn!(error = %flush_error, "partial export failed");
            }
            return Err(e);
        }

        let export = self.exporter.export_all(&state.collections)?;
        let summary = RunSummary {
            sections: state.stats,
            export,
        };
        tracing::info!(
            sections = summary.sections.len(),
            records = summary.total_records(),
            failures = summary.total_failures(),
            "run complete"
        );
        Ok(summary)
    }

    async fn scrape_sections(&self, state: &mut RunState) -> Result<()> {
        for (index, section) in self.site.sections().iter().enumerate() {
            let stats = self.scrape_section(index, section, state).await?;
            tracing::info!(
                section = %stats.name,
                pages = stats.pages,
                candidates = stats.candidates,
                duplicates = stats.duplicates,
                records = stats.records,
                failures = stats.failures,
                "section finished"
            );
            state.stats.push(stats);
        }
        Ok(())
    }

    async fn scrape_section(
        &self,
        index: usize,
        section: &SectionDefinition,
        state: &mut RunState,
    ) -> Result<SectionStats> {
        let mut stats = SectionStats::new(&section.name);

        for page in 1..=self.config.max_pages {
            let candidates = match self.site.fetch_listing(section, page).await {
                Ok(candidates) => candidates,
                Err(e) if !e.is_fatal() => {
                    tracing::warn!(section = %section.name, page, error = %e, "ending section");
                    stats.listing_failed = true;
                    break;
                }
                Err(e) => return Err(e),
            };
            stats.pages += 1;

            if candidates.is_empty() {
                tracing::info!(section = %section.name, page, "no listings, section done");
                break;
            }
            stats.candidates += candidates.len();

            for candidate in candidates {
                if !state.dedup.admit(&candidate.url) {
                    tracing::debug!(url = %candidate.url, "already recorded, skipping");
                    stats.duplicates += 1;
                    continue;
                }

                let record = self.build_record(section, &candidate).await?;
                if record.error().is_some() {
                    stats.failures += 1;
                }
                state.collections[index].push(record);
                stats.records += 1;
                state.admitted += 1;

                if self.config.save_every > 0 && state.admitted % self.config.save_every == 0 {
                    tracing::debug!(records = state.admitted, "periodic save");
                    self.exporter.export_all(&state.collections)?;
                }
            }
        }

        Ok(stats)
    }

    /// Record for an admitted candidate; page-load failures end up on the record.
    async fn build_record(
        &self,
        section: &SectionDefinition,
        candidate: &ListingCandidate,
    ) -> Result<PropertyRecord> {
        let mut record = PropertyRecord::for_listing(&section.name, &candidate.url, &candidate.title);
        if let Some(price) = &candidate.price {
            record.overwrite(CanonicalField::Price, &clean(CanonicalField::Price, price));
        }

        match self.site.fetch_detail(&candidate.url).await {
            Ok(html) => {
                let filled = self.site.extract(&html).apply_to(&mut record);
                tracing::debug!(url = %candidate.url, fields = filled, "record extracted");
            }
            Err(e) if !e.is_fatal() => {
                tracing::warn!(url = %candidate.url, error = %e, "detail page failed");
                record.set_error(&e.to_string());
            }
            Err(e) => return Err(e),
        }

        Ok(record)
    }
}
