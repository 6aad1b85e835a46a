//! Permit record data structures.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw text fragments located within one listing item.
///
/// Fields hold the text exactly as found in the markup; trimming and date
/// parsing happen during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// 1-based position of the item on the page
    pub position: usize,

    /// Council reference block (e.g. "DA-2025-001")
    pub reference: String,

    /// Application title block
    pub description: String,

    /// Site address block
    pub address: String,

    /// Closing-date block (e.g. "On display until 11 February 2025")
    pub closing_date: String,

    /// Link attribute of the first link in the item
    pub link: String,
}

/// A canonical planning-permit record, ready for storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PermitRecord {
    /// Unique business key
    pub council_reference: String,

    /// Permit/application title
    pub description: String,

    /// Site address
    pub address: String,

    /// Public-comment deadline
    pub on_notice_to: NaiveDate,

    /// Link to the associated document
    pub document_description: String,

    /// Date of the run that produced this record
    pub date_scraped: NaiveDate,

    #[serde(default)]
    pub date_received: String,
    #[serde(default)]
    pub applicant: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub stage_description: String,
    #[serde(default)]
    pub stage_status: String,
    #[serde(default)]
    pub title_reference: String,
}

impl PermitRecord {
    /// Format the record for a log line.
    pub fn summary(&self) -> String {
        format!(
            "Title: {}, Council Reference: {}, Address: {}, On Notice To: {}, Document URL: {}",
            self.description,
            self.council_reference,
            self.address,
            self.on_notice_to,
            self.document_description
        )
    }
}
