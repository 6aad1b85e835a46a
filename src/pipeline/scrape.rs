// src/pipeline/scrape.rs

//! Permit scraping pipeline: fetch → extract → normalize → store.

use chrono::NaiveDate;
use scraper::Html;

use crate::error::Result;
use crate::models::{Config, ScrapeOutcome, UpsertOutcome};
use crate::services::{Extractor, Normalizer};
use crate::storage::PermitStore;
use crate::utils::http::PageSource;

/// Run the scraper once against the configured listing page.
///
/// The store is only opened after the page has been fetched, so a failed
/// fetch leaves the database untouched.
pub fn run_scrape(
    config: &Config,
    source: &dyn PageSource,
    today: NaiveDate,
) -> Result<ScrapeOutcome> {
    let extractor = Extractor::new(&config.schema, &config.source.url)?;
    let normalizer = Normalizer::new(&config.schema);

    let url = &config.source.url;
    log::info!("Fetching page content from: {}", url);
    let html = source.fetch(url).inspect_err(|e| {
        log::error!("Failed to fetch page content: {}", e);
    })?;
    log::info!("Successfully fetched page content.");

    let document = Html::parse_document(&html);
    let store = PermitStore::open(&config.storage.database_path, &config.storage.table)?;

    let outcome = process_page(
        &extractor,
        &normalizer,
        &document,
        &store,
        today,
        config.scrape.halt_on_error,
    )?;

    log::info!(
        "Processed {} listing items: {} inserted, {} skipped, {} failed",
        outcome.items,
        outcome.inserted,
        outcome.skipped,
        outcome.failed
    );

    Ok(outcome)
}

/// Store every listing item on an already-parsed page.
///
/// Malformed items are logged and counted unless `halt_on_error` is set, in
/// which case the first one aborts the run. Records stored before the failure
/// stay stored.
pub fn process_page(
    extractor: &Extractor,
    normalizer: &Normalizer,
    document: &Html,
    store: &PermitStore,
    today: NaiveDate,
    halt_on_error: bool,
) -> Result<ScrapeOutcome> {
    let mut outcome = ScrapeOutcome::default();

    for entry in extractor.extract(document) {
        outcome.items += 1;

        let record = match entry.and_then(|raw| normalizer.normalize(raw, today)) {
            Ok(record) => record,
            Err(e) if e.is_record_level() && !halt_on_error => {
                log::warn!("Skipping listing item: {}", e);
                outcome.failed += 1;
                continue;
            }
            Err(e) => {
                log::error!("Aborting run: {}", e);
                return Err(e);
            }
        };

        log::debug!("Extracted Data: {}", record.summary());

        let result = store.upsert_if_absent(&record)?;
        match result {
            UpsertOutcome::Inserted => {
                log::info!("Data for {} saved to database.", record.council_reference);
            }
            UpsertOutcome::Skipped => {
                log::info!(
                    "Duplicate entry for document {} found. Skipping insertion.",
                    record.council_reference
                );
            }
        }
        outcome.record(result);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;
    use crate::error::AppError;

    /// Serves canned markup, or fails like a dead network when `body` is None.
    struct StaticPage {
        body: Option<String>,
        calls: Cell<usize>,
    }

    impl StaticPage {
        fn new(body: impl Into<String>) -> Self {
            Self {
                body: Some(body.into()),
                calls: Cell::new(0),
            }
        }

        fn unreachable() -> Self {
            Self {
                body: None,
                calls: Cell::new(0),
            }
        }
    }

    impl PageSource for StaticPage {
        fn fetch(&self, url: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.body
                .clone()
                .ok_or_else(|| AppError::fetch(url, "connection refused"))
        }
    }

    fn article(reference: &str, title: &str, address: &str, closing: &str, href: &str) -> String {
        format!(
            r#"<article class="list-item">
                 <a href="{href}">
                   <span class="da-application-number small-text">{reference}</span>
                   <h2 class="list-item-title">{title}</h2>
                 </a>
                 <p class="list-item-address">{address}</p>
                 <p class="applications-closing display-until small-text display-until-date">
                   {closing}
                 </p>
               </article>"#
        )
    }

    fn page(items: &[String]) -> String {
        format!(
            "<!DOCTYPE html><html><body><main>{}</main></body></html>",
            items.concat()
        )
    }

    fn shed_page() -> String {
        page(&[article(
            "DA-2025-001",
            "New Shed",
            "12 Smith St",
            "On display until 11 February 2025",
            "/docs/da-2025-001.pdf",
        )])
    }

    fn mixed_page() -> String {
        page(&[
            article("DA-1", "Deck", "1 Main Rd", "On display until 3 March 2025", "/docs/1.pdf"),
            article("DA-2", "Garage", "2 Main Rd", "On display until Tomorrow", "/docs/2.pdf"),
            article("DA-3", "Fence", "3 Main Rd", "On display until 5 March 2025", "/docs/3.pdf"),
        ])
    }

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.storage.database_path = dir.join("data.sqlite").to_string_lossy().into_owned();
        config
    }

    fn store_for(config: &Config) -> PermitStore {
        PermitStore::open(&config.storage.database_path, &config.storage.table).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    #[test]
    fn test_single_item_is_inserted() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());

        let outcome = run_scrape(&config, &StaticPage::new(shed_page()), today()).unwrap();
        assert_eq!(
            outcome,
            ScrapeOutcome {
                items: 1,
                inserted: 1,
                skipped: 0,
                failed: 0
            }
        );

        let record = store_for(&config).find("DA-2025-001").unwrap().unwrap();
        assert_eq!(record.description, "New Shed");
        assert_eq!(record.address, "12 Smith St");
        assert_eq!(record.on_notice_to.to_string(), "2025-02-11");
        assert_eq!(record.document_description, "/docs/da-2025-001.pdf");
        assert_eq!(record.date_scraped, today());
    }

    #[test]
    fn test_second_run_skips_everything() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        let source = StaticPage::new(shed_page());

        run_scrape(&config, &source, today()).unwrap();
        let second = run_scrape(&config, &source, today().succ_opt().unwrap()).unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 1);

        let store = store_for(&config);
        assert_eq!(store.count().unwrap(), 1);
        // The first scrape date is kept.
        let record = store.find("DA-2025-001").unwrap().unwrap();
        assert_eq!(record.date_scraped, today());
    }

    #[test]
    fn test_fetch_failure_leaves_store_untouched() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        run_scrape(&config, &StaticPage::new(shed_page()), today()).unwrap();

        let err = run_scrape(&config, &StaticPage::unreachable(), today()).unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
        assert_eq!(store_for(&config).count().unwrap(), 1);
    }

    #[test]
    fn test_fetch_failure_does_not_create_database() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());

        assert!(run_scrape(&config, &StaticPage::unreachable(), today()).is_err());
        assert!(!Path::new(&config.storage.database_path).exists());
    }

    #[test]
    fn test_malformed_date_is_isolated_by_default() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());

        let outcome = run_scrape(&config, &StaticPage::new(mixed_page()), today()).unwrap();
        assert_eq!(outcome.items, 3);
        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.failed, 1);

        let store = store_for(&config);
        assert!(store.find("DA-1").unwrap().is_some());
        assert!(store.find("DA-2").unwrap().is_none());
        assert!(store.find("DA-3").unwrap().is_some());
    }

    #[test]
    fn test_malformed_date_halts_in_strict_mode() {
        let tmp = TempDir::new().unwrap();
        let mut config = config_in(tmp.path());
        config.scrape.halt_on_error = true;

        let err = run_scrape(&config, &StaticPage::new(mixed_page()), today()).unwrap_err();
        assert!(matches!(err, AppError::DateParse { ref input, .. } if input == "Tomorrow"));

        // Records before the failure stay committed; nothing after it is written.
        let store = store_for(&config);
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.find("DA-1").unwrap().is_some());
        assert!(store.find("DA-3").unwrap().is_none());
    }

    #[test]
    fn test_missing_element_halts_in_strict_mode() {
        let tmp = TempDir::new().unwrap();
        let mut config = config_in(tmp.path());
        config.scrape.halt_on_error = true;
        let html = page(&["<article><p>No permit details</p></article>".to_string()]);

        let err = run_scrape(&config, &StaticPage::new(html), today()).unwrap_err();
        assert!(matches!(err, AppError::Structure { item: 1, .. }));
        assert_eq!(store_for(&config).count().unwrap(), 0);
    }

    #[test]
    fn test_duplicates_within_one_page() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(tmp.path());
        let html = page(&[
            article("DA-5", "Pool", "5 Beach Rd", "On display until 1 April 2025", "/a.pdf"),
            article("DA-5", "Pool", "5 Beach Rd", "On display until 1 April 2025", "/a.pdf"),
        ]);

        let outcome = run_scrape(&config, &StaticPage::new(html), today()).unwrap();
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(store_for(&config).count().unwrap(), 1);
    }

    #[test]
    fn test_invalid_schema_fails_before_fetch() {
        let tmp = TempDir::new().unwrap();
        let mut config = config_in(tmp.path());
        config.schema.item_selector = "[[".to_string();
        let source = StaticPage::new(shed_page());

        let err = run_scrape(&config, &source, today()).unwrap_err();
        assert!(matches!(err, AppError::Selector { .. }));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn test_process_page_with_custom_schema() {
        let html = Html::parse_document(
            r#"<ul>
                 <li class="app">
                   <b>PLN-24-0099</b><i>Dwelling</i><em>7 Hill St</em>
                   <time>Closes 20 June 2024</time><a data-doc="/d/99">doc</a>
                 </li>
               </ul>"#,
        );
        let schema = crate::models::PageSchema {
            item_selector: "li.app".to_string(),
            reference_selector: "b".to_string(),
            description_selector: "i".to_string(),
            address_selector: "em".to_string(),
            closing_date_selector: "time".to_string(),
            link_selector: "a".to_string(),
            link_attr: "data-doc".to_string(),
            closing_date_prefix: "Closes ".to_string(),
            ..Default::default()
        };
        let extractor = Extractor::new(&schema, "https://example.com/").unwrap();
        let normalizer = Normalizer::new(&schema);
        let store = PermitStore::open_in_memory("permits").unwrap();

        let outcome =
            process_page(&extractor, &normalizer, &html, &store, today(), false).unwrap();
        assert_eq!(outcome.inserted, 1);

        let record = store.find("PLN-24-0099").unwrap().unwrap();
        assert_eq!(record.on_notice_to.to_string(), "2024-06-20");
        assert_eq!(record.document_description, "/d/99");
    }
}
