//! [`EditionStore`] backed by PostgreSQL.
//!
//! Draft creation and publishing lock the country row (`SELECT ... FOR
//! UPDATE`) before checking slots, so concurrent writers for the same
//! country queue up. The partial unique indexes on `editions` back this up
//! and surface as [`CoreError::Conflict`] if anything slips through.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, Postgres, Transaction};
use travel_advice_core::action::{Action, NewAction};
use travel_advice_core::country::Country;
use travel_advice_core::edition::{Edition, NewEdition, Part};
use travel_advice_core::error::CoreError;
use travel_advice_core::store::{next_version_number, DraftSlot, EditionStore, PublishTransaction};
use travel_advice_core::types::{DbId, Timestamp};

use crate::error::to_core_error;
use crate::models::edition::EditionRow;
use crate::repositories::{ActionRepo, CountryRepo, EditionRepo, PartRepo};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgEditionStore {
    pool: DbPool,
}

impl PgEditionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Load parts for `rows` and assemble editions, keeping row order.
async fn with_parts(
    conn: &mut PgConnection,
    rows: Vec<EditionRow>,
) -> Result<Vec<Edition>, CoreError> {
    let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
    let mut parts: HashMap<DbId, Vec<Part>> = HashMap::new();
    for row in PartRepo::list_for_editions(&mut *conn, &ids)
        .await
        .map_err(to_core_error)?
    {
        parts.entry(row.edition_id).or_default().push(row.into());
    }

    rows.into_iter()
        .map(|row| {
            let edition_parts = parts.remove(&row.id).unwrap_or_default();
            row.into_edition(edition_parts)
        })
        .collect()
}

async fn load_edition(conn: &mut PgConnection, id: DbId) -> Result<Option<Edition>, CoreError> {
    let Some(row) = EditionRepo::find_by_id(&mut *conn, id)
        .await
        .map_err(to_core_error)?
    else {
        return Ok(None);
    };
    let parts = PartRepo::list_for_edition(&mut *conn, id)
        .await
        .map_err(to_core_error)?
        .into_iter()
        .map(Part::from)
        .collect();
    row.into_edition(parts).map(Some)
}

#[async_trait]
impl EditionStore for PgEditionStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(to_core_error)
    }

    async fn list_countries(&self) -> Result<Vec<Country>, CoreError> {
        let rows = CountryRepo::list(&self.pool).await.map_err(to_core_error)?;
        Ok(rows.into_iter().map(Country::from).collect())
    }

    async fn find_country(&self, slug: &str) -> Result<Option<Country>, CoreError> {
        let row = CountryRepo::find_by_slug(&self.pool, slug)
            .await
            .map_err(to_core_error)?;
        Ok(row.map(Country::from))
    }

    async fn find_edition(&self, id: DbId) -> Result<Option<Edition>, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(to_core_error)?;
        load_edition(&mut *conn, id).await
    }

    async fn list_editions(&self, country_slug: &str) -> Result<Vec<Edition>, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(to_core_error)?;
        let rows = EditionRepo::list_by_country(&mut *conn, country_slug)
            .await
            .map_err(to_core_error)?;
        with_parts(&mut *conn, rows).await
    }

    async fn find_published(&self, country_slug: &str) -> Result<Option<Edition>, CoreError> {
        let mut conn = self.pool.acquire().await.map_err(to_core_error)?;
        let Some(row) = EditionRepo::find_published(&mut *conn, country_slug)
            .await
            .map_err(to_core_error)?
        else {
            return Ok(None);
        };
        Ok(with_parts(&mut *conn, vec![row]).await?.pop())
    }

    async fn insert_draft(
        &self,
        draft: NewEdition,
        slot: DraftSlot,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Edition, CoreError> {
        let mut tx = self.pool.begin().await.map_err(to_core_error)?;

        CountryRepo::lock(&mut *tx, &draft.country_slug)
            .await
            .map_err(to_core_error)?
            .ok_or_else(|| CoreError::country_not_found(&draft.country_slug))?;

        // Parts play no part in slot checks.
        let existing = EditionRepo::list_by_country(&mut *tx, &draft.country_slug)
            .await
            .map_err(to_core_error)?
            .into_iter()
            .map(|row| row.into_edition(Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        slot.check(&draft.country_slug, &existing)?;

        let row = EditionRepo::insert_draft(&mut *tx, &draft, next_version_number(&existing), now)
            .await
            .map_err(to_core_error)?;
        let parts = PartRepo::replace(&mut *tx, row.id, &draft.parts)
            .await
            .map_err(to_core_error)?;
        ActionRepo::create(&mut *tx, row.id, &action, now)
            .await
            .map_err(to_core_error)?;

        tx.commit().await.map_err(to_core_error)?;
        row.into_edition(parts.into_iter().map(Part::from).collect())
    }

    async fn save_draft(&self, edition: &Edition, now: Timestamp) -> Result<Edition, CoreError> {
        let mut tx = self.pool.begin().await.map_err(to_core_error)?;

        let Some(row) = EditionRepo::update_draft(&mut *tx, edition, now)
            .await
            .map_err(to_core_error)?
        else {
            // Work out why the guarded update matched nothing.
            let current = EditionRepo::find_by_id(&mut *tx, edition.id)
                .await
                .map_err(to_core_error)?
                .ok_or_else(|| CoreError::edition_not_found(edition.id))?
                .into_edition(Vec::new())?;
            current.ensure_draft("edit")?;
            return Err(CoreError::Conflict(format!(
                "Edition {} has been changed by someone else since it was loaded",
                edition.id
            )));
        };

        let parts = PartRepo::replace(&mut *tx, edition.id, &edition.parts)
            .await
            .map_err(to_core_error)?;
        tx.commit().await.map_err(to_core_error)?;
        row.into_edition(parts.into_iter().map(Part::from).collect())
    }

    async fn append_action(
        &self,
        edition_id: DbId,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Action, CoreError> {
        if EditionRepo::find_by_id(&self.pool, edition_id)
            .await
            .map_err(to_core_error)?
            .is_none()
        {
            return Err(CoreError::edition_not_found(edition_id));
        }
        ActionRepo::create(&self.pool, edition_id, &action, now)
            .await
            .map_err(to_core_error)?
            .try_into()
    }

    async fn list_actions(&self, edition_id: DbId) -> Result<Vec<Action>, CoreError> {
        ActionRepo::list_for_edition(&self.pool, edition_id)
            .await
            .map_err(to_core_error)?
            .into_iter()
            .map(Action::try_from)
            .collect()
    }

    async fn list_country_actions(&self, country_slug: &str) -> Result<Vec<Action>, CoreError> {
        ActionRepo::list_for_country(&self.pool, country_slug)
            .await
            .map_err(to_core_error)?
            .into_iter()
            .map(Action::try_from)
            .collect()
    }

    async fn begin_publish(
        &self,
        edition_id: DbId,
    ) -> Result<Box<dyn PublishTransaction>, CoreError> {
        let country_slug = EditionRepo::find_by_id(&self.pool, edition_id)
            .await
            .map_err(to_core_error)?
            .ok_or_else(|| CoreError::edition_not_found(edition_id))?
            .country_slug;

        let mut tx = self.pool.begin().await.map_err(to_core_error)?;
        CountryRepo::lock(&mut *tx, &country_slug)
            .await
            .map_err(to_core_error)?;

        // Re-read under the lock; a concurrent publish may have got here first.
        let edition = load_edition(&mut *tx, edition_id)
            .await?
            .ok_or_else(|| CoreError::edition_not_found(edition_id))?;
        let previous = match EditionRepo::find_published(&mut *tx, &country_slug)
            .await
            .map_err(to_core_error)?
        {
            Some(row) => with_parts(&mut *tx, vec![row]).await?.pop(),
            None => None,
        };

        Ok(Box::new(PgPublishTransaction {
            tx,
            edition,
            previous,
        }))
    }
}

struct PgPublishTransaction {
    tx: Transaction<'static, Postgres>,
    edition: Edition,
    previous: Option<Edition>,
}

#[async_trait]
impl PublishTransaction for PgPublishTransaction {
    fn edition(&self) -> &Edition {
        &self.edition
    }

    fn previous(&self) -> Option<&Edition> {
        self.previous.as_ref()
    }

    async fn apply(
        &mut self,
        published: &Edition,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Edition, CoreError> {
        self.edition.ensure_draft("publish")?;

        if let Some(previous) = &self.previous {
            let archived = EditionRepo::mark_archived(&mut *self.tx, previous.id, now)
                .await
                .map_err(to_core_error)?;
            if !archived {
                return Err(CoreError::Conflict(format!(
                    "Edition {} is no longer the published edition",
                    previous.id
                )));
            }
        }

        let Some(row) = EditionRepo::mark_published(&mut *self.tx, published, now)
            .await
            .map_err(to_core_error)?
        else {
            // Work out why the guarded update matched nothing.
            let current = EditionRepo::find_by_id(&mut *self.tx, published.id)
                .await
                .map_err(to_core_error)?
                .ok_or_else(|| CoreError::edition_not_found(published.id))?
                .into_edition(Vec::new())?;
            current.ensure_draft("publish")?;
            return Err(CoreError::Conflict(format!(
                "Edition {} has been changed by someone else since it was loaded",
                published.id
            )));
        };
        ActionRepo::create(&mut *self.tx, published.id, &action, now)
            .await
            .map_err(to_core_error)?;

        row.into_edition(self.edition.parts.clone())
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        self.tx.commit().await.map_err(to_core_error)
    }
}
