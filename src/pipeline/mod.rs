//! Pipeline entry points.
//!
//! - `run_scrape`: Fetch the listing page and store new permits
//! - `run_validate`: Check configuration and page schema

pub mod scrape;
pub mod validate;

pub use scrape::{process_page, run_scrape};
pub use validate::run_validate;
