//! Repository for the `countries` table.

use sqlx::PgExecutor;

use crate::models::country::CountryRow;

const COLUMNS: &str = "slug, content_id, name, created_at";

/// Read access to the seeded country list.
pub struct CountryRepo;

impl CountryRepo {
    /// All countries in slug order.
    pub async fn list<'e>(executor: impl PgExecutor<'e>) -> Result<Vec<CountryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM countries ORDER BY slug");
        sqlx::query_as::<_, CountryRow>(&query)
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_slug<'e>(
        executor: impl PgExecutor<'e>,
        slug: &str,
    ) -> Result<Option<CountryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM countries WHERE slug = $1");
        sqlx::query_as::<_, CountryRow>(&query)
            .bind(slug)
            .fetch_optional(executor)
            .await
    }

    /// Take the country's row lock for the rest of the transaction.
    ///
    /// Every write that creates or publishes an edition locks the country
    /// first, which serializes slot checks per country.
    pub async fn lock<'e>(
        executor: impl PgExecutor<'e>,
        slug: &str,
    ) -> Result<Option<CountryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM countries WHERE slug = $1 FOR UPDATE");
        sqlx::query_as::<_, CountryRow>(&query)
            .bind(slug)
            .fetch_optional(executor)
            .await
    }
}
