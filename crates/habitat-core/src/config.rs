//! Configuration management for Habitat.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/habitat/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Pagination, retry and pacing settings
    pub scraping: ScrapingConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Output settings
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if not found.
    pub fn load_from(config_path: &Path) -> ConfigResult<Self> {
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(config_path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `HABITAT_MAX_PAGES`: Override the per-section page limit
    /// - `HABITAT_HEADLESS`: Override browser headless mode (true/false)
    /// - `HABITAT_OUTPUT_DIR`: Override the export directory
    pub fn load_with_env(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `HABITAT_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("HABITAT_MAX_PAGES") {
            if let Ok(pages) = val.parse() {
                self.scraping.max_pages = pages;
                tracing::debug!("Override scraping.max_pages from env: {}", pages);
            }
        }

        if let Ok(val) = std::env::var("HABITAT_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("HABITAT_OUTPUT_DIR") {
            if !val.is_empty() {
                tracing::debug!("Override export.output_dir from env: {}", val);
                self.export.output_dir = PathBuf::from(val);
            }
        }
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.scraping.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scraping.max_retries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.scraping.pacing_jitter_min_ms > self.scraping.pacing_jitter_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "scraping.pacing_jitter_min_ms".to_string(),
                reason: format!(
                    "must not exceed pacing_jitter_max_ms ({})",
                    self.scraping.pacing_jitter_max_ms
                ),
            });
        }

        if self.scraping.readiness_marker.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scraping.readiness_marker".to_string(),
                reason: "cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/habitat/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "habitat", "habitat").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Pagination, retry and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapingConfig {
    /// Highest listing page visited per section
    pub max_pages: u32,
    /// Flush collections to disk every N admitted records (0 = only at the end)
    pub save_every: usize,
    /// Attempts per detail page before the record is marked as failed
    pub max_retries: u32,
    /// Seconds to wait for the readiness marker on each navigation
    pub page_load_timeout_secs: u64,
    /// CSS selector whose presence marks a page as loaded
    pub readiness_marker: String,
    /// Fixed part of the pause after each successful navigation
    pub pacing_base_ms: u64,
    /// Lower bound of the random part of the pause
    pub pacing_jitter_min_ms: u64,
    /// Upper bound of the random part of the pause
    pub pacing_jitter_max_ms: u64,
    /// Delay between failed attempts, multiplied by the attempt number
    pub retry_delay_ms: u64,
}

impl ScrapingConfig {
    /// Readiness wait as a `Duration`.
    #[must_use]
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    /// Configuration with every delay set to zero, for tests and dry runs.
    #[must_use]
    pub fn without_delays(mut self) -> Self {
        self.pacing_base_ms = 0;
        self.pacing_jitter_min_ms = 0;
        self.pacing_jitter_max_ms = 0;
        self.retry_delay_ms = 0;
        self
    }
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            max_pages: 1,
            save_every: 5,
            max_retries: 3,
            page_load_timeout_secs: 15,
            readiness_marker: "body".to_string(),
            pacing_base_ms: 3000,
            pacing_jitter_min_ms: 500,
            pacing_jitter_max_ms: 1500,
            retry_delay_ms: 2000,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Pick a random user agent and viewport at launch
    pub randomize_fingerprint: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1920,
            window_height: 1080,
            randomize_fingerprint: true,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving the CSV and JSON files
    pub output_dir: PathBuf,
    /// Prefix CSV files with a UTF-8 byte order mark
    pub utf8_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("realestate_data"),
            utf8_bom: true,
        }
    }
}
