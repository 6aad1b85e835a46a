//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::PageSchema;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing page to scrape
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP client settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Where each field lives on the listing page
    #[serde(default)]
    pub schema: PageSchema,

    /// SQLite database settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Run behavior
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.url.trim().is_empty() {
            return Err(AppError::validation("source.url is empty"));
        }
        Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        for (name, selector) in self.schema.selectors() {
            if selector.trim().is_empty() {
                return Err(AppError::validation(format!("schema.{name} is empty")));
            }
        }
        if self.schema.link_attr.trim().is_empty() {
            return Err(AppError::validation("schema.link_attr is empty"));
        }
        if self.schema.date_format.trim().is_empty() {
            return Err(AppError::validation("schema.date_format is empty"));
        }
        if self.storage.database_path.trim().is_empty() {
            return Err(AppError::validation("storage.database_path is empty"));
        }
        if !is_identifier(&self.storage.table) {
            return Err(AppError::validation(format!(
                "storage.table '{}' must contain only letters, digits and '_'",
                self.storage.table
            )));
        }
        Ok(())
    }
}

/// Whether `name` can be spliced into SQL as a bare table name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Source page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the permit listing page
    #[serde(default = "defaults::source_url")]
    pub url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// SQLite storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(default = "defaults::database_path")]
    pub database_path: String,

    /// Table holding permit records
    #[serde(default = "defaults::table")]
    pub table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: defaults::database_path(),
            table: defaults::table(),
        }
    }
}

/// Run behavior settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Abort the whole run on the first malformed listing item
    #[serde(default)]
    pub halt_on_error: bool,
}

mod defaults {
    pub fn source_url() -> String {
        "https://www.burnie.tas.gov.au/Development/Planning/Permit-applications-on-exhibition"
            .into()
    }

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; permit-scraper/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Storage defaults
    pub fn database_path() -> String {
        "data.sqlite".into()
    }
    pub fn table() -> String {
        "burnie".into()
    }
}
