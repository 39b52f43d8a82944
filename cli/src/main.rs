//! Habitat CLI - scrape one site definition and export its listings.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use habitat_browser::BrowserEngine;
use habitat_core::{AppConfig, SiteId};
use habitat_scanner::{BatchExporter, RunSummary, ScrapeOrchestrator, SelectorSite};
use habitat_site::SiteLoader;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("scrape failed: {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,habitat=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config =
        AppConfig::load_with_env(cli.config.as_deref()).context("failed to load configuration")?;

    // Flags win over the file and the environment
    if let Some(max_pages) = cli.max_pages {
        config.scraping.max_pages = max_pages;
    }
    if let Some(output_dir) = cli.output_dir {
        config.export.output_dir = output_dir;
    }
    if cli.headed {
        config.browser.headless = false;
    }
    config.validate()?;

    let loader = match cli.sites_dir {
        Some(dir) => SiteLoader::new(dir)?,
        None => SiteLoader::with_default_dir()?,
    };
    let site_id = SiteId::new(&cli.site)?;
    let definition = loader.load(&site_id)?;

    let engine = Arc::new(
        BrowserEngine::launch(&config.browser)
            .await
            .context("failed to launch browser")?,
    );
    let site = SelectorSite::new(definition, Arc::clone(&engine), &config.scraping)?;
    tracing::info!(
        site = %site.definition().name(),
        sections = site.definition().sections.len(),
        max_pages = config.scraping.max_pages,
        output_dir = %config.export.output_dir.display(),
        "starting scrape"
    );
    let orchestrator = ScrapeOrchestrator::new(
        site,
        config.scraping.clone(),
        BatchExporter::from_config(&config.export),
    );

    let outcome = orchestrator.run().await;
    drop(orchestrator);

    match Arc::try_unwrap(engine) {
        Ok(engine) => {
            if let Err(e) = engine.close().await {
                tracing::warn!(error = %e, "browser did not close cleanly");
            }
        }
        Err(_) => tracing::warn!("browser still in use, leaving it to exit with the process"),
    }

    report(&outcome?);
    Ok(())
}

fn report(summary: &RunSummary) {
    for section in &summary.sections {
        tracing::info!(
            section = %section.name,
            pages = section.pages,
            records = section.records,
            duplicates = section.duplicates,
            failures = section.failures,
            listing_failed = section.listing_failed,
            "section summary"
        );
    }
    for file in &summary.export.files {
        tracing::info!(path = %file.display(), "wrote");
    }
    tracing::info!(
        records = summary.total_records(),
        failures = summary.total_failures(),
        "scrape finished"
    );
}
