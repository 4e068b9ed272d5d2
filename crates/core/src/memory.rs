//! In-process [`EditionStore`] behind a single tokio mutex.
//!
//! Every write takes the mutex, so slot checks and publishes are
//! serialized. A publish transaction holds the mutex until it is committed
//! or dropped and stages its writes on a copy of the state.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::action::{Action, NewAction};
use crate::country::Country;
use crate::edition::{Edition, EditionState, NewEdition};
use crate::error::CoreError;
use crate::store::{next_version_number, DraftSlot, EditionStore, PublishTransaction};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    countries: BTreeMap<String, Country>,
    editions: BTreeMap<DbId, Edition>,
    actions: Vec<Action>,
    last_edition_id: DbId,
    last_action_id: DbId,
}

impl MemoryState {
    fn editions_for(&self, country_slug: &str) -> Vec<Edition> {
        let mut editions: Vec<Edition> = self
            .editions
            .values()
            .filter(|e| e.country_slug == country_slug)
            .cloned()
            .collect();
        editions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        editions
    }

    fn published_for(&self, country_slug: &str) -> Option<Edition> {
        self.editions
            .values()
            .find(|e| e.country_slug == country_slug && e.state == EditionState::Published)
            .cloned()
    }

    fn push_action(&mut self, edition_id: DbId, action: NewAction, now: Timestamp) -> Action {
        self.last_action_id += 1;
        let action = Action {
            id: self.last_action_id,
            edition_id,
            request_type: action.request_type,
            requester: action.requester,
            comment: action.comment,
            created_at: now,
        };
        self.actions.push(action.clone());
        action
    }
}

/// Store used by tests and local runs without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryEditionStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEditionStore {
    pub fn new(countries: impl IntoIterator<Item = Country>) -> Self {
        let state = MemoryState {
            countries: countries.into_iter().map(|c| (c.slug.clone(), c)).collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

#[async_trait]
impl EditionStore for MemoryEditionStore {
    async fn health_check(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn list_countries(&self) -> Result<Vec<Country>, CoreError> {
        Ok(self.state.lock().await.countries.values().cloned().collect())
    }

    async fn find_country(&self, slug: &str) -> Result<Option<Country>, CoreError> {
        Ok(self.state.lock().await.countries.get(slug).cloned())
    }

    async fn find_edition(&self, id: DbId) -> Result<Option<Edition>, CoreError> {
        Ok(self.state.lock().await.editions.get(&id).cloned())
    }

    async fn list_editions(&self, country_slug: &str) -> Result<Vec<Edition>, CoreError> {
        Ok(self.state.lock().await.editions_for(country_slug))
    }

    async fn find_published(&self, country_slug: &str) -> Result<Option<Edition>, CoreError> {
        Ok(self.state.lock().await.published_for(country_slug))
    }

    async fn insert_draft(
        &self,
        draft: NewEdition,
        slot: DraftSlot,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Edition, CoreError> {
        let mut state = self.state.lock().await;
        if !state.countries.contains_key(&draft.country_slug) {
            return Err(CoreError::country_not_found(&draft.country_slug));
        }

        let existing = state.editions_for(&draft.country_slug);
        slot.check(&draft.country_slug, &existing)?;

        state.last_edition_id += 1;
        let id = state.last_edition_id;
        let edition = draft.into_edition(id, next_version_number(&existing), now);
        state.editions.insert(id, edition.clone());
        state.push_action(id, action, now);
        Ok(edition)
    }

    async fn save_draft(&self, edition: &Edition, now: Timestamp) -> Result<Edition, CoreError> {
        let mut state = self.state.lock().await;
        let stored = state
            .editions
            .get_mut(&edition.id)
            .ok_or_else(|| CoreError::edition_not_found(edition.id))?;

        stored.ensure_draft("edit")?;
        if stored.lock_version != edition.lock_version {
            return Err(CoreError::Conflict(format!(
                "Edition {} has been changed by someone else since it was loaded",
                edition.id
            )));
        }

        let mut saved = edition.clone();
        saved.state = EditionState::Draft;
        saved.lock_version = stored.lock_version + 1;
        saved.updated_at = now;
        *stored = saved.clone();
        Ok(saved)
    }

    async fn append_action(
        &self,
        edition_id: DbId,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Action, CoreError> {
        let mut state = self.state.lock().await;
        if !state.editions.contains_key(&edition_id) {
            return Err(CoreError::edition_not_found(edition_id));
        }
        Ok(state.push_action(edition_id, action, now))
    }

    async fn list_actions(&self, edition_id: DbId) -> Result<Vec<Action>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .actions
            .iter()
            .filter(|a| a.edition_id == edition_id)
            .cloned()
            .collect())
    }

    async fn list_country_actions(&self, country_slug: &str) -> Result<Vec<Action>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .actions
            .iter()
            .filter(|a| {
                state
                    .editions
                    .get(&a.edition_id)
                    .is_some_and(|e| e.country_slug == country_slug)
            })
            .cloned()
            .collect())
    }

    async fn begin_publish(
        &self,
        edition_id: DbId,
    ) -> Result<Box<dyn PublishTransaction>, CoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let edition = guard
            .editions
            .get(&edition_id)
            .cloned()
            .ok_or_else(|| CoreError::edition_not_found(edition_id))?;
        let previous = guard.published_for(&edition.country_slug);
        let staged = guard.clone();

        Ok(Box::new(MemoryPublishTransaction {
            guard,
            staged,
            edition,
            previous,
        }))
    }
}

struct MemoryPublishTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    edition: Edition,
    previous: Option<Edition>,
}

#[async_trait]
impl PublishTransaction for MemoryPublishTransaction {
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
            let mut archived = previous.archived()?;
            archived.lock_version += 1;
            archived.updated_at = now;
            self.staged.editions.insert(archived.id, archived);
        }

        let mut stored = published.clone();
        stored.state = EditionState::Published;
        stored.lock_version = self.edition.lock_version + 1;
        stored.updated_at = now;
        self.staged.editions.insert(stored.id, stored.clone());
        self.staged.push_action(stored.id, action, now);
        Ok(stored)
    }

    async fn commit(self: Box<Self>) -> Result<(), CoreError> {
        let MemoryPublishTransaction {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}
