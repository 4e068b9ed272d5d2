//! Country reference data.
//!
//! Countries are seeded once and never edited through the lifecycle; every
//! edition belongs to exactly one of them.

use serde::{Deserialize, Serialize};

/// Path prefix shared by the index document and every country page.
pub const BASE_PATH: &str = "/foreign-travel-advice";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub slug: String,
    pub content_id: String,
    pub name: String,
}

impl Country {
    pub fn new(slug: &str, content_id: &str, name: &str) -> Self {
        Self {
            slug: slug.to_string(),
            content_id: content_id.to_string(),
            name: name.to_string(),
        }
    }

    /// Public path of this country's travel advice page.
    pub fn base_path(&self) -> String {
        format!("{BASE_PATH}/{}", self.slug)
    }

    /// Title given to a country's very first edition.
    pub fn default_edition_title(&self) -> String {
        format!("{} travel advice", self.name)
    }
}
