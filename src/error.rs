// src/error.rs

//! Unified error handling for the permit scraper.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// The listing page could not be retrieved
    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    /// A listing item is missing an element the page schema expects
    #[error("Listing item {item}: missing {field}")]
    Structure { item: usize, field: String },

    /// The closing-date text did not match the configured date format
    #[error("Cannot parse date '{input}' with format '{format}': {message}")]
    DateParse {
        input: String,
        format: String,
        message: String,
    },

    /// SQLite operation failed
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a structure error for a listing item (1-based position).
    pub fn structure(item: usize, field: impl Into<String>) -> Self {
        Self::Structure {
            item,
            field: field.into(),
        }
    }

    /// Create a date parsing error.
    pub fn date_parse(
        input: impl Into<String>,
        format: impl Into<String>,
        message: impl fmt::Display,
    ) -> Self {
        Self::DateParse {
            input: input.into(),
            format: format.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error is confined to a single listing item.
    ///
    /// Record-level errors can be skipped when the run isolates failures;
    /// everything else aborts the run.
    pub fn is_record_level(&self) -> bool {
        matches!(self, Self::Structure { .. } | Self::DateParse { .. })
    }
}
