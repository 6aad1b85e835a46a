// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Anything that can produce the raw markup of a page.
pub trait PageSource {
    /// Retrieve the body of `url` as text.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP page source.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the configured user agent and timeout.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

impl PageSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(url, e))?;
        response.text().map_err(|e| AppError::fetch(url, e))
    }
}

/// Create a configured blocking HTTP client.
pub fn create_client(config: &FetcherConfig) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))
}
