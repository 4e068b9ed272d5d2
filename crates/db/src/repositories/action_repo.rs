//! Repository for the `actions` table.

use sqlx::PgExecutor;
use travel_advice_core::action::NewAction;
use travel_advice_core::types::{DbId, Timestamp};

use crate::models::action::ActionRow;

const COLUMNS: &str = "id, edition_id, request_type, requester, comment, created_at";

/// Append-only edition history.
pub struct ActionRepo;

impl ActionRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        edition_id: DbId,
        action: &NewAction,
        now: Timestamp,
    ) -> Result<ActionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO actions (edition_id, request_type, requester, comment, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ActionRow>(&query)
            .bind(edition_id)
            .bind(action.request_type.as_str())
            .bind(&action.requester)
            .bind(&action.comment)
            .bind(now)
            .fetch_one(executor)
            .await
    }

    pub async fn list_for_edition<'e>(
        executor: impl PgExecutor<'e>,
        edition_id: DbId,
    ) -> Result<Vec<ActionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM actions WHERE edition_id = $1 ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ActionRow>(&query)
            .bind(edition_id)
            .fetch_all(executor)
            .await
    }

    /// Actions of every edition of a country, oldest first.
    pub async fn list_for_country<'e>(
        executor: impl PgExecutor<'e>,
        country_slug: &str,
    ) -> Result<Vec<ActionRow>, sqlx::Error> {
        let query = "SELECT a.id, a.edition_id, a.request_type, a.requester, a.comment, a.created_at
             FROM actions a
             JOIN editions e ON e.id = a.edition_id
             WHERE e.country_slug = $1
             ORDER BY a.created_at, a.id";
        sqlx::query_as::<_, ActionRow>(query)
            .bind(country_slug)
            .fetch_all(executor)
            .await
    }
}
