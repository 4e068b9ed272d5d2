//! Edition and part rows.

use sqlx::types::Json;
use sqlx::FromRow;
use travel_advice_core::edition::{AlertStatus, AssetRef, Edition, EditionState, Part};
use travel_advice_core::error::CoreError;
use travel_advice_core::types::{DbId, Timestamp};

/// A row from the `editions` table. Parts live in `edition_parts`.
#[derive(Debug, Clone, FromRow)]
pub struct EditionRow {
    pub id: DbId,
    pub country_slug: String,
    pub version_number: i32,
    pub state: String,
    pub title: String,
    pub overview: String,
    pub summary: String,
    pub change_description: String,
    pub minor_update: bool,
    pub alert_status: Vec<String>,
    pub image: Option<Json<AssetRef>>,
    pub document: Option<Json<AssetRef>>,
    pub published_at: Option<Timestamp>,
    pub lock_version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EditionRow {
    /// Assemble the domain edition from this row and its parts.
    pub fn into_edition(self, parts: Vec<Part>) -> Result<Edition, CoreError> {
        let alert_status = self
            .alert_status
            .iter()
            .map(|s| AlertStatus::parse(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Edition {
            id: self.id,
            country_slug: self.country_slug,
            version_number: self.version_number,
            state: EditionState::parse(&self.state)?,
            title: self.title,
            overview: self.overview,
            summary: self.summary,
            change_description: self.change_description,
            minor_update: self.minor_update,
            alert_status,
            parts,
            image: self.image.map(|j| j.0),
            document: self.document.map(|j| j.0),
            published_at: self.published_at,
            lock_version: self.lock_version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A row from the `edition_parts` table.
#[derive(Debug, Clone, FromRow)]
pub struct PartRow {
    pub id: DbId,
    pub edition_id: DbId,
    pub sort_order: i32,
    pub title: String,
    pub slug: String,
    pub body: String,
}

impl From<PartRow> for Part {
    fn from(row: PartRow) -> Self {
        Part {
            title: row.title,
            slug: row.slug,
            body: row.body,
            order: row.sort_order,
        }
    }
}

/// Stored form of an edition's alert flags.
pub fn alert_status_column(statuses: &[AlertStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}
