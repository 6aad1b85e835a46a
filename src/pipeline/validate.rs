// src/pipeline/validate.rs

use std::fmt::Write;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{Extractor, parse_date};

/// Validate configuration values and compile the page schema.
pub fn run_validate(config: &Config) -> Result<()> {
    config.validate()?;
    log::info!("✓ Config OK");
    log::info!("  - source: {}", config.source.url);
    log::info!("  - user agent: {}", config.fetcher.user_agent);
    log::info!("  - timeout: {}s", config.fetcher.timeout_secs);
    log::info!(
        "  - database: {} (table {})",
        config.storage.database_path,
        config.storage.table
    );

    Extractor::new(&config.schema, &config.source.url)?;
    log::info!("✓ Page schema selectors compile");
    for (name, selector) in config.schema.selectors() {
        log::debug!("  - {}: {}", name, selector);
    }

    // The format must at least round-trip a known date.
    let format = &config.schema.date_format;
    let mut sample = String::new();
    let known = NaiveDate::from_ymd_opt(2025, 2, 11).unwrap_or_default();
    write!(sample, "{}", known.format(format)).map_err(|_| {
        AppError::validation(format!("schema.date_format '{format}' is not a valid format"))
    })?;
    if parse_date(&sample, format)? != known {
        return Err(AppError::validation(format!(
            "schema.date_format '{format}' does not round-trip dates"
        )));
    }
    log::info!("✓ Date format '{}' parses '{}'", config.schema.date_format, sample);

    Ok(())
}
