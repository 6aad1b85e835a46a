//! SQLite storage backend.
//!
//! ## Table Layout
//!
//! ```text
//! id | description | date_scraped | date_received | on_notice_to | address
//!    | council_reference | applicant | owner | stage_description
//!    | stage_status | document_description | title_reference
//! ```
//!
//! Insert-if-absent is a single `INSERT .. SELECT .. WHERE NOT EXISTS`
//! statement, so concurrent runs cannot store the same permit twice. A unique
//! index on `council_reference` backs lookups where the existing data allows
//! one.

use std::path::Path;

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{AppError, Result};
use crate::models::{PermitRecord, UpsertOutcome, is_identifier};

const COLUMNS: &str = "description, date_scraped, date_received, on_notice_to, address, \
     council_reference, applicant, owner, stage_description, stage_status, \
     document_description, title_reference";

/// Permit records persisted in one SQLite table.
pub struct PermitStore {
    conn: Connection,
    table: String,
}

impl PermitStore {
    /// Open (or create) the database file and bootstrap the table.
    pub fn open(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, table)
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory(table: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, table)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self> {
        if !is_identifier(table) {
            return Err(AppError::config(format!("Invalid table name '{table}'")));
        }
        let store = Self {
            conn,
            table: table.to_string(),
        };
        store.init()?;
        Ok(store)
    }

    /// Idempotent schema bootstrap.
    ///
    /// Tables written by earlier scrapers may already hold duplicate
    /// references, in which case the unique index cannot be built. Dedup does
    /// not depend on it, so that only costs lookup speed.
    fn init(&self) -> Result<()> {
        let table = &self.table;
        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
              id INTEGER PRIMARY KEY,
              description TEXT,
              date_scraped TEXT,
              date_received TEXT,
              on_notice_to TEXT,
              address TEXT,
              council_reference TEXT,
              applicant TEXT,
              owner TEXT,
              stage_description TEXT,
              stage_status TEXT,
              document_description TEXT,
              title_reference TEXT
            );
            "#
        ))?;

        if let Err(e) = self.conn.execute_batch(&format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_council_reference
               ON {table}(council_reference);"
        )) {
            log::warn!(
                "Could not create unique index on {}.council_reference ({}). \
                 Existing duplicate references are left as they are.",
                table,
                e
            );
        }
        Ok(())
    }

    /// Insert the record unless its council reference is already stored.
    ///
    /// The existence check and the insert are one statement, so SQLite runs
    /// them under a single write lock. Existing rows are never modified.
    pub fn upsert_if_absent(&self, record: &PermitRecord) -> Result<UpsertOutcome> {
        let changed = self.conn.execute(
            &format!(
                "INSERT INTO {table} ({COLUMNS})
                 SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12
                 WHERE NOT EXISTS (
                   SELECT 1 FROM {table} WHERE council_reference = ?6
                 )",
                table = self.table
            ),
            params![
                record.description,
                record.date_scraped,
                record.date_received,
                record.on_notice_to,
                record.address,
                record.council_reference,
                record.applicant,
                record.owner,
                record.stage_description,
                record.stage_status,
                record.document_description,
                record.title_reference,
            ],
        )?;

        Ok(if changed == 0 {
            UpsertOutcome::Skipped
        } else {
            UpsertOutcome::Inserted
        })
    }

    /// Number of stored records.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Look up a record by council reference.
    ///
    /// A stored row whose dates cannot be read is reported as absent.
    pub fn find(&self, council_reference: &str) -> Result<Option<PermitRecord>> {
        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {COLUMNS} FROM {} WHERE council_reference = ?1 ORDER BY id LIMIT 1",
                    self.table
                ),
                [council_reference],
                Self::from_row,
            )
            .optional()?;
        Ok(record.flatten())
    }

    /// All stored records in insertion order, optionally capped.
    ///
    /// Rows whose dates cannot be read are skipped with a warning.
    pub fn list(&self, limit: Option<usize>) -> Result<Vec<PermitRecord>> {
        // SQLite treats a negative LIMIT as "no limit".
        let limit = limit.map_or(-1, |n| n as i64);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY id LIMIT ?1",
            self.table
        ))?;
        let rows = stmt
            .query_map([limit], Self::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().flatten().collect())
    }

    /// Table this store writes to.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Map a row, or `None` when a date column is NULL or not ISO-8601.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Option<PermitRecord>> {
        let council_reference = text(row, 5)?;
        let (Some(date_scraped), Some(on_notice_to)) = (date(row, 1)?, date(row, 3)?) else {
            log::warn!(
                "Skipping stored permit '{}': unreadable date_scraped or on_notice_to",
                council_reference
            );
            return Ok(None);
        };

        Ok(Some(PermitRecord {
            description: text(row, 0)?,
            date_scraped,
            date_received: text(row, 2)?,
            on_notice_to,
            address: text(row, 4)?,
            council_reference,
            applicant: text(row, 6)?,
            owner: text(row, 7)?,
            stage_description: text(row, 8)?,
            stage_status: text(row, 9)?,
            document_description: text(row, 10)?,
            title_reference: text(row, 11)?,
        }))
    }
}

// Columns are nullable; rows written by other tools may hold NULL.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    Ok(row
        .get::<_, Option<String>>(idx)?
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}
