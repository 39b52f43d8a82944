//! Command-line argument parsing.

use clap::Parser;
use std::path::PathBuf;

/// Habitat - scrape property listings into CSV and JSON.
#[derive(Debug, Parser)]
#[command(name = "habitat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Site definition to scrape
    #[arg(short, long, default_value = "bogota-real-estate")]
    pub site: String,

    /// Directory holding site definition files
    #[arg(long, env = "HABITAT_SITES_DIR")]
    pub sites_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listing pages to visit per section
    #[arg(short, long)]
    pub max_pages: Option<u32>,

    /// Directory receiving the exported files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,
}
