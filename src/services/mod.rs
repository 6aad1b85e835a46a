//! Service layer for the permit scraper.
//!
//! This module contains the business logic for:
//! - Listing item extraction (`Extractor`)
//! - Record normalization (`Normalizer`)

mod extractor;
mod normalizer;

pub use extractor::{Extractor, parse_selector};
pub use normalizer::{Normalizer, parse_date};
