//! Repository for the `editions` table.

use sqlx::types::Json;
use sqlx::PgExecutor;
use travel_advice_core::edition::{Edition, NewEdition};
use travel_advice_core::types::{DbId, Timestamp};

use crate::models::edition::{alert_status_column, EditionRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, country_slug, version_number, state, title, overview, summary, \
    change_description, minor_update, alert_status, image, document, published_at, \
    lock_version, created_at, updated_at";

/// Edition rows and their state transitions.
pub struct EditionRepo;

impl EditionRepo {
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<EditionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM editions WHERE id = $1");
        sqlx::query_as::<_, EditionRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// All editions of a country, ordered by version number descending.
    pub async fn list_by_country<'e>(
        executor: impl PgExecutor<'e>,
        country_slug: &str,
    ) -> Result<Vec<EditionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM editions
             WHERE country_slug = $1
             ORDER BY version_number DESC"
        );
        sqlx::query_as::<_, EditionRow>(&query)
            .bind(country_slug)
            .fetch_all(executor)
            .await
    }

    pub async fn find_published<'e>(
        executor: impl PgExecutor<'e>,
        country_slug: &str,
    ) -> Result<Option<EditionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM editions WHERE country_slug = $1 AND state = 'published'"
        );
        sqlx::query_as::<_, EditionRow>(&query)
            .bind(country_slug)
            .fetch_optional(executor)
            .await
    }

    /// Insert a draft with the given version number.
    pub async fn insert_draft<'e>(
        executor: impl PgExecutor<'e>,
        draft: &NewEdition,
        version_number: i32,
        now: Timestamp,
    ) -> Result<EditionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO editions
                (country_slug, version_number, state, title, overview, summary,
                 change_description, minor_update, alert_status, image, document,
                 created_at, updated_at)
             VALUES ($1, $2, 'draft', $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditionRow>(&query)
            .bind(&draft.country_slug)
            .bind(version_number)
            .bind(&draft.title)
            .bind(&draft.overview)
            .bind(&draft.summary)
            .bind(&draft.change_description)
            .bind(draft.minor_update)
            .bind(alert_status_column(&draft.alert_status))
            .bind(draft.image.as_ref().map(Json))
            .bind(draft.document.as_ref().map(Json))
            .bind(now)
            .fetch_one(executor)
            .await
    }

    /// Write a draft's editable fields, bumping its lock version.
    ///
    /// Returns `None` when the row is gone, no longer a draft, or its lock
    /// version differs from `edition.lock_version`.
    pub async fn update_draft<'e>(
        executor: impl PgExecutor<'e>,
        edition: &Edition,
        now: Timestamp,
    ) -> Result<Option<EditionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE editions SET
                title = $3,
                overview = $4,
                summary = $5,
                change_description = $6,
                minor_update = $7,
                alert_status = $8,
                image = $9,
                document = $10,
                lock_version = lock_version + 1,
                updated_at = $11
             WHERE id = $1 AND lock_version = $2 AND state = 'draft'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditionRow>(&query)
            .bind(edition.id)
            .bind(edition.lock_version)
            .bind(&edition.title)
            .bind(&edition.overview)
            .bind(&edition.summary)
            .bind(&edition.change_description)
            .bind(edition.minor_update)
            .bind(alert_status_column(&edition.alert_status))
            .bind(edition.image.as_ref().map(Json))
            .bind(edition.document.as_ref().map(Json))
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// Move a draft to `published`, storing its publication stamp and the
    /// change description it goes out with.
    ///
    /// Returns `None` if the row is no longer a draft or was saved since
    /// `edition` was read.
    pub async fn mark_published<'e>(
        executor: impl PgExecutor<'e>,
        edition: &Edition,
        now: Timestamp,
    ) -> Result<Option<EditionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE editions SET
                state = 'published',
                published_at = $3,
                change_description = $4,
                lock_version = lock_version + 1,
                updated_at = $5
             WHERE id = $1 AND lock_version = $2 AND state = 'draft'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EditionRow>(&query)
            .bind(edition.id)
            .bind(edition.lock_version)
            .bind(edition.published_at)
            .bind(&edition.change_description)
            .bind(now)
            .fetch_optional(executor)
            .await
    }

    /// Archive a published edition. Returns `false` if it was not published.
    pub async fn mark_archived<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE editions SET state = 'archived', lock_version = lock_version + 1, \
             updated_at = $2 WHERE id = $1 AND state = 'published'",
        )
        .bind(id)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
