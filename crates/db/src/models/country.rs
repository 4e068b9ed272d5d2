//! Country rows.

use sqlx::FromRow;
use travel_advice_core::country::Country;
use travel_advice_core::types::Timestamp;
use uuid::Uuid;

/// A row from the `countries` table.
#[derive(Debug, Clone, FromRow)]
pub struct CountryRow {
    pub slug: String,
    pub content_id: Uuid,
    pub name: String,
    pub created_at: Timestamp,
}

impl From<CountryRow> for Country {
    fn from(row: CountryRow) -> Self {
        Country {
            slug: row.slug,
            content_id: row.content_id.to_string(),
            name: row.name,
        }
    }
}
