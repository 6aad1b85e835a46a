//! Raw entry normalization.
//!
//! Turns the text fragments of one listing item into a canonical
//! [`PermitRecord`].

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{PageSchema, PermitRecord, RawEntry};

/// Converts raw entries into permit records.
pub struct Normalizer {
    closing_date_prefix: String,
    date_format: String,
}

impl Normalizer {
    /// Create a normalizer using the schema's date settings.
    pub fn new(schema: &PageSchema) -> Self {
        Self {
            closing_date_prefix: schema.closing_date_prefix.clone(),
            date_format: schema.date_format.clone(),
        }
    }

    /// Normalize one raw entry, stamping it with the run date.
    pub fn normalize(&self, raw: RawEntry, today: NaiveDate) -> Result<PermitRecord> {
        let council_reference = raw.reference.trim().to_string();
        if council_reference.is_empty() {
            return Err(AppError::structure(raw.position, "council reference text"));
        }

        let on_notice_to = self.closing_date(&raw.closing_date)?;

        Ok(PermitRecord {
            council_reference,
            description: raw.description.trim().to_string(),
            address: raw.address.trim().to_string(),
            on_notice_to,
            document_description: raw.link.trim().to_string(),
            date_scraped: today,
            date_received: String::new(),
            applicant: String::new(),
            owner: String::new(),
            stage_description: String::new(),
            stage_status: String::new(),
            title_reference: String::new(),
        })
    }

    /// Strip the closing-date prefix and parse what remains.
    pub fn closing_date(&self, text: &str) -> Result<NaiveDate> {
        let text = text.trim();
        let text = text
            .strip_prefix(self.closing_date_prefix.as_str())
            .unwrap_or(text)
            .trim();
        parse_date(text, &self.date_format)
    }
}

/// Parse a long-form date such as "11 February 2025".
pub fn parse_date(text: &str, format: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, format).map_err(|e| AppError::date_parse(text, format, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(reference: &str, closing_date: &str) -> RawEntry {
        RawEntry {
            position: 1,
            reference: reference.to_string(),
            description: "\n   New Shed  ".to_string(),
            address: " 12 Smith St\n".to_string(),
            closing_date: closing_date.to_string(),
            link: " /docs/da-2025-001.pdf ".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    #[test]
    fn test_normalize_trims_and_parses() {
        let normalizer = Normalizer::new(&PageSchema::default());
        let record = normalizer
            .normalize(
                raw("  DA-2025-001 ", "\n On display until 11 February 2025 \n"),
                today(),
            )
            .unwrap();

        assert_eq!(record.council_reference, "DA-2025-001");
        assert_eq!(record.description, "New Shed");
        assert_eq!(record.address, "12 Smith St");
        assert_eq!(record.on_notice_to.to_string(), "2025-02-11");
        assert_eq!(record.document_description, "/docs/da-2025-001.pdf");
        assert_eq!(record.date_scraped, today());
        assert!(record.applicant.is_empty());
        assert!(record.title_reference.is_empty());
    }

    #[test]
    fn test_closing_date_without_prefix() {
        let normalizer = Normalizer::new(&PageSchema::default());
        let date = normalizer.closing_date("3 March 2025").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
    }

    #[test]
    fn test_parse_date_matches_calendar() {
        let cases = [
            ("1 January 2024", (2024, 1, 1)),
            ("29 February 2024", (2024, 2, 29)),
            ("09 September 2025", (2025, 9, 9)),
            ("31 December 2025", (2025, 12, 31)),
        ];
        for (text, (y, m, d)) in cases {
            let date = parse_date(text, "%d %B %Y").unwrap();
            assert_eq!(date, NaiveDate::from_ymd_opt(y, m, d).unwrap(), "{text}");
            assert_eq!(date.to_string(), format!("{y:04}-{m:02}-{d:02}"));
        }
    }

    #[test]
    fn test_malformed_dates_are_rejected() {
        for text in ["Tomorrow", "32 Marchember 2025", "30 February 2025", "2025-02-11", ""] {
            let err = parse_date(text, "%d %B %Y").unwrap_err();
            assert!(matches!(err, AppError::DateParse { .. }), "{text}");
        }
    }

    #[test]
    fn test_empty_reference_is_structure_error() {
        let normalizer = Normalizer::new(&PageSchema::default());
        let err = normalizer
            .normalize(raw("   ", "On display until 11 February 2025"), today())
            .unwrap_err();
        assert!(matches!(err, AppError::Structure { item: 1, .. }));
    }

    #[test]
    fn test_custom_prefix_and_format() {
        let schema = PageSchema {
            closing_date_prefix: "Closes: ".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            ..PageSchema::default()
        };
        let normalizer = Normalizer::new(&schema);
        let date = normalizer.closing_date("Closes: 11/02/2025").unwrap();
        assert_eq!(date.to_string(), "2025-02-11");
    }
}
