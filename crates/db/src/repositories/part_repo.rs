//! Repository for the `edition_parts` table.

use sqlx::{PgConnection, PgExecutor};
use travel_advice_core::edition::Part;
use travel_advice_core::types::DbId;

use crate::models::edition::PartRow;

const COLUMNS: &str = "id, edition_id, sort_order, title, slug, body";

/// Ordered parts of an edition. The list is always replaced as a whole.
pub struct PartRepo;

impl PartRepo {
    pub async fn list_for_edition<'e>(
        executor: impl PgExecutor<'e>,
        edition_id: DbId,
    ) -> Result<Vec<PartRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edition_parts WHERE edition_id = $1 ORDER BY sort_order"
        );
        sqlx::query_as::<_, PartRow>(&query)
            .bind(edition_id)
            .fetch_all(executor)
            .await
    }

    /// Parts of several editions at once, ordered by edition then position.
    pub async fn list_for_editions<'e>(
        executor: impl PgExecutor<'e>,
        edition_ids: &[DbId],
    ) -> Result<Vec<PartRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM edition_parts
             WHERE edition_id = ANY($1)
             ORDER BY edition_id, sort_order"
        );
        sqlx::query_as::<_, PartRow>(&query)
            .bind(edition_ids)
            .fetch_all(executor)
            .await
    }

    /// Delete the edition's parts and insert `parts` in their place.
    pub async fn replace(
        conn: &mut PgConnection,
        edition_id: DbId,
        parts: &[Part],
    ) -> Result<Vec<PartRow>, sqlx::Error> {
        sqlx::query("DELETE FROM edition_parts WHERE edition_id = $1")
            .bind(edition_id)
            .execute(&mut *conn)
            .await?;

        let query = format!(
            "INSERT INTO edition_parts (edition_id, sort_order, title, slug, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let mut rows = Vec::with_capacity(parts.len());
        for part in parts {
            let row = sqlx::query_as::<_, PartRow>(&query)
                .bind(edition_id)
                .bind(part.order)
                .bind(&part.title)
                .bind(&part.slug)
                .bind(&part.body)
                .fetch_one(&mut *conn)
                .await?;
            rows.push(row);
        }
        Ok(rows)
    }
}
