// src/services/extractor.rs

//! Listing page extractor.
//!
//! Locates repeating listing items with the configured page schema and pulls
//! the raw text of each field out of every item.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{PageSchema, RawEntry};
use crate::utils::resolve_url;

/// Extracts raw entries from a parsed listing page.
pub struct Extractor {
    item: Selector,
    reference: Selector,
    description: Selector,
    address: Selector,
    closing_date: Selector,
    link: Selector,
    link_attr: String,
    base_url: Option<Url>,
}

impl Extractor {
    /// Compile the schema's selectors.
    ///
    /// When `schema.resolve_links` is set, links are resolved against
    /// `source_url`.
    pub fn new(schema: &PageSchema, source_url: &str) -> Result<Self> {
        let base_url = if schema.resolve_links {
            Some(Url::parse(source_url)?)
        } else {
            None
        };

        Ok(Self {
            item: parse_selector(&schema.item_selector)?,
            reference: parse_selector(&schema.reference_selector)?,
            description: parse_selector(&schema.description_selector)?,
            address: parse_selector(&schema.address_selector)?,
            closing_date: parse_selector(&schema.closing_date_selector)?,
            link: parse_selector(&schema.link_selector)?,
            link_attr: schema.link_attr.clone(),
            base_url,
        })
    }

    /// Lazily yield one raw entry per listing item, in document order.
    pub fn extract<'a>(
        &'a self,
        document: &'a Html,
    ) -> impl Iterator<Item = Result<RawEntry>> + 'a {
        document
            .select(&self.item)
            .enumerate()
            .map(move |(index, item)| self.extract_item(index + 1, item))
    }

    fn extract_item(&self, position: usize, item: ElementRef<'_>) -> Result<RawEntry> {
        let reference = Self::text(item, &self.reference, position, "council reference")?;
        let description = Self::text(item, &self.description, position, "description")?;
        let address = Self::text(item, &self.address, position, "address")?;
        let closing_date = Self::text(item, &self.closing_date, position, "closing date")?;

        let raw_link = item
            .select(&self.link)
            .next()
            .and_then(|el| el.value().attr(&self.link_attr))
            .ok_or_else(|| AppError::structure(position, format!("link {}", self.link_attr)))?;
        let link = match &self.base_url {
            Some(base) => resolve_url(base, raw_link),
            None => raw_link.to_string(),
        };

        Ok(RawEntry {
            position,
            reference,
            description,
            address,
            closing_date,
            link,
        })
    }

    fn text(
        item: ElementRef<'_>,
        selector: &Selector,
        position: usize,
        field: &str,
    ) -> Result<String> {
        item.select(selector)
            .next()
            .map(|el| el.text().collect())
            .ok_or_else(|| AppError::structure(position, field))
    }
}

/// Parse a CSS selector, mapping failures to [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
