// src/models/mod.rs

//! Domain models for the permit scraper.

mod config;
mod permit;
mod schema;

// Re-export all public types
pub use config::{Config, FetcherConfig, ScrapeConfig, SourceConfig, StorageConfig, is_identifier};
pub use permit::{PermitRecord, RawEntry};
pub use schema::PageSchema;

/// Result of storing one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Skipped,
}

/// Summary of a scrape run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    /// Listing items found on the page
    pub items: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Items that failed extraction or normalization
    pub failed: usize,
}

impl ScrapeOutcome {
    /// Tally one store result.
    pub fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Skipped => self.skipped += 1,
        }
    }
}
