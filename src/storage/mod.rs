//! Storage for scraped permit records.

pub mod sqlite;

// Re-export for convenience
pub use sqlite::PermitStore;
