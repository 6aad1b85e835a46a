// src/models/schema.rs

//! CSS selectors describing where each field lives on the listing page.

use serde::{Deserialize, Serialize};

/// Page schema: how to locate listing items and their fields.
///
/// Field selectors are evaluated relative to each matched item; the first
/// match wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageSchema {
    /// Selector for each repeating listing item
    #[serde(default = "defaults::item_selector")]
    pub item_selector: String,

    /// Selector for the council reference within an item
    #[serde(default = "defaults::reference_selector")]
    pub reference_selector: String,

    /// Selector for the application title within an item
    #[serde(default = "defaults::description_selector")]
    pub description_selector: String,

    /// Selector for the site address within an item
    #[serde(default = "defaults::address_selector")]
    pub address_selector: String,

    /// Selector for the closing-date text within an item
    #[serde(default = "defaults::closing_date_selector")]
    pub closing_date_selector: String,

    /// Selector for the document link within an item
    #[serde(default = "defaults::link_selector")]
    pub link_selector: String,

    /// HTML attribute name for extracting links (usually "href")
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Literal prefix stripped from the closing-date text
    #[serde(default = "defaults::closing_date_prefix")]
    pub closing_date_prefix: String,

    /// chrono format of the closing date after the prefix is removed
    #[serde(default = "defaults::date_format")]
    pub date_format: String,

    /// Resolve relative links against the source URL
    #[serde(default)]
    pub resolve_links: bool,
}

impl Default for PageSchema {
    fn default() -> Self {
        Self {
            item_selector: defaults::item_selector(),
            reference_selector: defaults::reference_selector(),
            description_selector: defaults::description_selector(),
            address_selector: defaults::address_selector(),
            closing_date_selector: defaults::closing_date_selector(),
            link_selector: defaults::link_selector(),
            link_attr: defaults::link_attr(),
            closing_date_prefix: defaults::closing_date_prefix(),
            date_format: defaults::date_format(),
            resolve_links: false,
        }
    }
}

impl PageSchema {
    /// Named selectors, in the order they are checked.
    pub fn selectors(&self) -> [(&'static str, &str); 6] {
        [
            ("item_selector", self.item_selector.as_str()),
            ("reference_selector", self.reference_selector.as_str()),
            ("description_selector", self.description_selector.as_str()),
            ("address_selector", self.address_selector.as_str()),
            ("closing_date_selector", self.closing_date_selector.as_str()),
            ("link_selector", self.link_selector.as_str()),
        ]
    }
}

// Burnie City Council "Permit applications on exhibition" layout.
mod defaults {
    pub fn item_selector() -> String {
        "article".into()
    }
    pub fn reference_selector() -> String {
        ".da-application-number.small-text".into()
    }
    pub fn description_selector() -> String {
        ".list-item-title".into()
    }
    pub fn address_selector() -> String {
        ".list-item-address".into()
    }
    pub fn closing_date_selector() -> String {
        ".applications-closing.display-until.small-text.display-until-date".into()
    }
    pub fn link_selector() -> String {
        "a".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
    pub fn closing_date_prefix() -> String {
        "On display until ".into()
    }
    pub fn date_format() -> String {
        "%d %B %Y".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let schema: PageSchema = toml::from_str(
            r#"
            item_selector = "li.application"
            resolve_links = true
            "#,
        )
        .unwrap();

        assert_eq!(schema.item_selector, "li.application");
        assert!(schema.resolve_links);
        assert_eq!(schema.link_attr, "href");
        assert_eq!(schema.date_format, "%d %B %Y");
    }

    #[test]
    fn test_selectors_lists_every_lookup() {
        let schema = PageSchema::default();
        let names: Vec<_> = schema.selectors().iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "item_selector");
    }
}
