//! Persistence seam for the lifecycle service.
//!
//! Implementations must enforce the per-country slot rules atomically:
//! at most one draft and at most one published edition per country, even
//! under concurrent requests.

use async_trait::async_trait;

use crate::action::{Action, NewAction};
use crate::country::Country;
use crate::edition::{Edition, EditionState, NewEdition};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Which occupancy rule a new draft must pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftSlot {
    /// The country must have no draft and no published edition.
    Initial,
    /// The country must have no draft.
    NewVersion,
}

impl DraftSlot {
    /// Check the rule against the country's current editions.
    pub fn check(&self, country_slug: &str, existing: &[Edition]) -> Result<(), CoreError> {
        let occupied = match self {
            Self::Initial => existing.iter().any(|e| e.state != EditionState::Archived),
            Self::NewVersion => existing.iter().any(Edition::is_draft),
        };
        if !occupied {
            return Ok(());
        }
        let msg = match self {
            Self::Initial => format!("{country_slug} already has a draft or published edition"),
            Self::NewVersion => format!("{country_slug} already has a draft edition"),
        };
        Err(CoreError::Conflict(msg))
    }
}

/// Next version number given the country's current editions.
pub fn next_version_number(existing: &[Edition]) -> i32 {
    existing.iter().map(|e| e.version_number).max().unwrap_or(0) + 1
}

#[async_trait]
pub trait EditionStore: Send + Sync {
    async fn health_check(&self) -> Result<(), CoreError>;

    async fn list_countries(&self) -> Result<Vec<Country>, CoreError>;

    async fn find_country(&self, slug: &str) -> Result<Option<Country>, CoreError>;

    async fn find_edition(&self, id: DbId) -> Result<Option<Edition>, CoreError>;

    /// All editions of a country, newest version first.
    async fn list_editions(&self, country_slug: &str) -> Result<Vec<Edition>, CoreError>;

    async fn find_published(&self, country_slug: &str) -> Result<Option<Edition>, CoreError>;

    /// Insert a draft, assigning the next version number and recording
    /// `action` on it, as one atomic step guarded by `slot`.
    async fn insert_draft(
        &self,
        draft: NewEdition,
        slot: DraftSlot,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Edition, CoreError>;

    /// Persist an edited draft. Fails with [`CoreError::Conflict`] when the
    /// stored lock version no longer matches `edition.lock_version`, and
    /// with [`CoreError::InvalidState`] when it is no longer a draft.
    async fn save_draft(&self, edition: &Edition, now: Timestamp) -> Result<Edition, CoreError>;

    async fn append_action(
        &self,
        edition_id: DbId,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Action, CoreError>;

    /// Actions of one edition in creation order.
    async fn list_actions(&self, edition_id: DbId) -> Result<Vec<Action>, CoreError>;

    /// Actions of every edition of a country in creation order.
    async fn list_country_actions(&self, country_slug: &str) -> Result<Vec<Action>, CoreError>;

    /// Open a publish unit of work holding the country's write lock.
    async fn begin_publish(&self, edition_id: DbId)
        -> Result<Box<dyn PublishTransaction>, CoreError>;
}

/// One publish, applied all-or-nothing.
///
/// Dropping the transaction without calling [`commit`](Self::commit)
/// discards everything applied so far.
#[async_trait]
pub trait PublishTransaction: Send {
    /// The edition being published, as read under the lock.
    fn edition(&self) -> &Edition;

    /// The country's currently published edition, if any.
    fn previous(&self) -> Option<&Edition>;

    /// Archive the previous edition, store `published` and record `action`.
    async fn apply(
        &mut self,
        published: &Edition,
        action: NewAction,
        now: Timestamp,
    ) -> Result<Edition, CoreError>;

    async fn commit(self: Box<Self>) -> Result<(), CoreError>;
}
