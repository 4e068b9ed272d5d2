//! Content payloads sent to the publishing API.
//!
//! Everything here is pure: the same edition always produces the same
//! payload.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::country::{Country, BASE_PATH};
use crate::edition::Edition;
use crate::markup::{join_text, strip_markup};
use crate::types::Timestamp;

pub const DOCUMENT_TYPE: &str = "travel_advice";
pub const INDEX_DOCUMENT_TYPE: &str = "travel_advice_index";
pub const INDEX_TITLE: &str = "Foreign travel advice";
pub const INDEX_DESCRIPTION: &str =
    "Latest travel advice by country including safety and security, entry requirements, travel warnings and health";
pub const PUBLISHING_APP: &str = "travel-advice-publisher";
pub const RENDERING_APP: &str = "frontend";
pub const LOCALE: &str = "en";

/// How the downstream platform should treat a content change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateType {
    Major,
    Minor,
    Republish,
}

impl UpdateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Republish => "republish",
        }
    }

    /// Update type of an editor-triggered publish.
    pub fn for_edition(edition: &Edition) -> Self {
        if edition.minor_update {
            Self::Minor
        } else {
            Self::Major
        }
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: String,
    #[serde(rename = "type")]
    pub route_type: String,
}

impl Route {
    pub fn exact(path: &str) -> Self {
        Self {
            path: path.to_string(),
            route_type: "exact".to_string(),
        }
    }
}

/// Body of a `PUT /v2/content/{content_id}` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentPayload {
    pub base_path: String,
    pub title: String,
    pub description: String,
    pub document_type: String,
    pub schema_name: String,
    pub locale: String,
    pub publishing_app: String,
    pub rendering_app: String,
    pub update_type: UpdateType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_updated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexable_content: Option<String>,
    pub routes: Vec<Route>,
    pub details: serde_json::Value,
}

/// ISO-8601 in UTC with a `Z` suffix, whole seconds.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Plain-text summary followed by each part's title and body.
pub fn indexable_content(edition: &Edition) -> String {
    let summary = strip_markup(&edition.summary);
    let parts = edition.parts.iter().flat_map(|p| [p.title.as_str(), p.body.as_str()]);
    join_text(std::iter::once(summary.as_str()).chain(parts))
}

/// Payload for one country's edition.
pub fn compute_publish_payload(
    edition: &Edition,
    country: &Country,
    update_type: UpdateType,
) -> ContentPayload {
    let base_path = country.base_path();
    let alert_status: Vec<&str> = edition.alert_status.iter().map(|s| s.as_str()).collect();
    let parts: Vec<serde_json::Value> = edition
        .parts
        .iter()
        .map(|p| json!({ "title": p.title, "slug": p.slug, "body": p.body }))
        .collect();

    ContentPayload {
        routes: vec![Route::exact(&base_path)],
        base_path,
        title: edition.title.clone(),
        description: edition.overview.clone(),
        document_type: DOCUMENT_TYPE.to_string(),
        schema_name: DOCUMENT_TYPE.to_string(),
        locale: LOCALE.to_string(),
        publishing_app: PUBLISHING_APP.to_string(),
        rendering_app: RENDERING_APP.to_string(),
        update_type,
        public_updated_at: edition.published_at.as_ref().map(format_timestamp),
        indexable_content: Some(indexable_content(edition)),
        details: json!({
            "summary": edition.summary,
            "change_description": edition.change_description,
            "alert_status": alert_status,
            "parts": parts,
            "image": edition.image,
            "document": edition.document,
            "country": { "slug": country.slug, "name": country.name },
        }),
    }
}

/// Payload for the `/foreign-travel-advice` index page.
pub fn compute_index_payload(now: Timestamp) -> ContentPayload {
    ContentPayload {
        base_path: BASE_PATH.to_string(),
        title: INDEX_TITLE.to_string(),
        description: INDEX_DESCRIPTION.to_string(),
        document_type: INDEX_DOCUMENT_TYPE.to_string(),
        schema_name: INDEX_DOCUMENT_TYPE.to_string(),
        locale: LOCALE.to_string(),
        publishing_app: PUBLISHING_APP.to_string(),
        rendering_app: RENDERING_APP.to_string(),
        update_type: UpdateType::Minor,
        public_updated_at: Some(format_timestamp(&now)),
        indexable_content: None,
        routes: vec![Route::exact(BASE_PATH), Route::exact(&format!("{BASE_PATH}.json"))],
        details: json!({}),
    }
}
