//! The edition lifecycle service.
//!
//! [`EditionLifecycle`] is the single entry point for every state change:
//! creating drafts, editing them, publishing and annotating. It owns the
//! store and the downstream collaborators so callers never touch them
//! directly.

use std::sync::Arc;

use serde::Serialize;

use crate::action::{group_history, Action, Actor, NewAction, VersionHistory};
use crate::changes::{apply_changes, AssetChange, EditionChanges};
use crate::clock::{Clock, SystemClock};
use crate::country::Country;
use crate::edition::{AssetRef, Edition, NewEdition};
use crate::error::CoreError;
use crate::payload::{compute_publish_payload, ContentPayload, UpdateType};
use crate::publishing::{asset_id_from_url, AssetManager, PublishingApi};
use crate::store::{DraftSlot, EditionStore};
use crate::types::DbId;

/// Current asset details for an edition, as reported by the asset manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditionAssets {
    pub image: Option<AssetRef>,
    pub document: Option<AssetRef>,
}

#[derive(Clone)]
pub struct EditionLifecycle {
    store: Arc<dyn EditionStore>,
    publishing_api: Arc<dyn PublishingApi>,
    asset_manager: Arc<dyn AssetManager>,
    clock: Arc<dyn Clock>,
}

impl EditionLifecycle {
    pub fn new(
        store: Arc<dyn EditionStore>,
        publishing_api: Arc<dyn PublishingApi>,
        asset_manager: Arc<dyn AssetManager>,
    ) -> Self {
        Self {
            store,
            publishing_api,
            asset_manager,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a fixed one in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Arc<dyn EditionStore> {
        &self.store
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub async fn countries(&self) -> Result<Vec<Country>, CoreError> {
        self.store.list_countries().await
    }

    pub async fn country(&self, slug: &str) -> Result<Country, CoreError> {
        self.store
            .find_country(slug)
            .await?
            .ok_or_else(|| CoreError::country_not_found(slug))
    }

    pub async fn edition(&self, id: DbId) -> Result<Edition, CoreError> {
        self.store
            .find_edition(id)
            .await?
            .ok_or_else(|| CoreError::edition_not_found(id))
    }

    /// All editions of a country, newest version first.
    pub async fn editions(&self, country_slug: &str) -> Result<Vec<Edition>, CoreError> {
        self.country(country_slug).await?;
        self.store.list_editions(country_slug).await
    }

    pub async fn actions(&self, edition_id: DbId) -> Result<Vec<Action>, CoreError> {
        self.edition(edition_id).await?;
        self.store.list_actions(edition_id).await
    }

    /// Actions of every edition of the country, grouped by version.
    pub async fn history(&self, country_slug: &str) -> Result<Vec<VersionHistory>, CoreError> {
        let editions = self.editions(country_slug).await?;
        let actions = self.store.list_country_actions(country_slug).await?;
        Ok(group_history(&editions, actions))
    }

    /// Whether a new draft may be copied from one of the country's
    /// editions right now.
    pub async fn can_create_new_version(&self, country_slug: &str) -> Result<bool, CoreError> {
        let editions = self.store.list_editions(country_slug).await?;
        Ok(!editions.is_empty() && DraftSlot::NewVersion.check(country_slug, &editions).is_ok())
    }

    /// Fetch fresh details for the edition's image and document.
    pub async fn edition_assets(&self, edition_id: DbId) -> Result<EditionAssets, CoreError> {
        let edition = self.edition(edition_id).await?;
        let mut assets = EditionAssets::default();
        if let Some(image) = &edition.image {
            assets.image = Some(self.asset_manager.asset(asset_id_from_url(&image.id)).await?);
        }
        if let Some(document) = &edition.document {
            assets.document = Some(
                self.asset_manager
                    .asset(asset_id_from_url(&document.id))
                    .await?,
            );
        }
        Ok(assets)
    }

    // -----------------------------------------------------------------------
    // Drafts
    // -----------------------------------------------------------------------

    /// Create a country's first draft (or its first after everything was
    /// archived).
    pub async fn create_initial_edition(
        &self,
        country_slug: &str,
        actor: &Actor,
    ) -> Result<Edition, CoreError> {
        let country = self.country(country_slug).await?;
        let draft = NewEdition::blank(&country.slug, &country.default_edition_title());

        let edition = self
            .store
            .insert_draft(
                draft,
                DraftSlot::Initial,
                NewAction::new_version(actor),
                self.clock.now(),
            )
            .await?;

        tracing::info!(
            edition_id = edition.id,
            country = %edition.country_slug,
            version = edition.version_number,
            requester = actor.name(),
            "Initial edition created"
        );
        Ok(edition)
    }

    /// Create a new draft copying the content of `source_id`.
    pub async fn create_new_version(
        &self,
        source_id: DbId,
        actor: &Actor,
    ) -> Result<Edition, CoreError> {
        let source = self.edition(source_id).await?;

        let edition = self
            .store
            .insert_draft(
                source.to_new_draft(),
                DraftSlot::NewVersion,
                NewAction::new_version(actor),
                self.clock.now(),
            )
            .await?;

        tracing::info!(
            edition_id = edition.id,
            source_id,
            country = %edition.country_slug,
            version = edition.version_number,
            requester = actor.name(),
            "New edition version created"
        );
        Ok(edition)
    }

    /// Apply editor changes to a draft.
    ///
    /// Validation runs before any upload or write, so a rejected update
    /// leaves the stored edition exactly as it was.
    pub async fn update_draft(
        &self,
        edition_id: DbId,
        changes: EditionChanges,
    ) -> Result<Edition, CoreError> {
        let edition = self.edition(edition_id).await?;
        let mut updated = apply_changes(&edition, &changes).inspect_err(|e| {
            tracing::warn!(edition_id, error = %e, "Edition update rejected");
        })?;

        if let Some(change) = changes.image {
            updated.image = self.resolve_asset(change).await?;
        }
        if let Some(change) = changes.document {
            updated.document = self.resolve_asset(change).await?;
        }

        let saved = self.store.save_draft(&updated, self.clock.now()).await?;
        tracing::info!(
            edition_id,
            parts = saved.parts.len(),
            lock_version = saved.lock_version,
            "Edition draft saved"
        );
        Ok(saved)
    }

    async fn resolve_asset(&self, change: AssetChange) -> Result<Option<AssetRef>, CoreError> {
        match change {
            AssetChange::Upload(upload) => {
                let filename = upload.filename.clone();
                let asset = self.asset_manager.create_asset(upload).await?;
                tracing::info!(asset_id = %asset.id, filename = %filename, "Asset uploaded");
                Ok(Some(asset))
            }
            AssetChange::Remove => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Publishing
    // -----------------------------------------------------------------------

    /// Publish a draft, archiving the country's previously published
    /// edition.
    ///
    /// The archive, the state change, the action and the downstream calls
    /// form one unit: if the publishing API rejects either call nothing is
    /// kept and the edition stays a draft.
    pub async fn publish(&self, edition_id: DbId, actor: &Actor) -> Result<Edition, CoreError> {
        self.publish_version(edition_id, None, actor).await
    }

    /// Publish, rejecting the request if the draft's lock version no longer
    /// matches `expected_lock_version`.
    async fn publish_version(
        &self,
        edition_id: DbId,
        expected_lock_version: Option<i32>,
        actor: &Actor,
    ) -> Result<Edition, CoreError> {
        let edition = self.edition(edition_id).await?;
        edition.ensure_draft("publish")?;
        let country = self.country(&edition.country_slug).await?;

        let mut txn = self.store.begin_publish(edition_id).await?;
        if let Some(expected) = expected_lock_version {
            if txn.edition().lock_version != expected {
                return Err(CoreError::Conflict(format!(
                    "Edition {edition_id} has been changed by someone else since it was loaded"
                )));
            }
        }
        let now = self.clock.now();
        let prepared = txn.edition().prepare_publication(txn.previous(), now)?;
        let previous_id = txn.previous().map(|e| e.id);

        let published = txn
            .apply(&prepared, NewAction::publish(actor, &prepared), now)
            .await?;

        let update_type = UpdateType::for_edition(&published);
        let payload = compute_publish_payload(&published, &country, update_type);
        if let Err(e) = self
            .send_to_publishing_api(&country.content_id, &payload, update_type)
            .await
        {
            tracing::error!(
                edition_id,
                country = %country.slug,
                error = %e,
                "Publishing API call failed, edition left as draft"
            );
            return Err(e);
        }

        txn.commit().await?;

        tracing::info!(
            edition_id,
            country = %country.slug,
            archived_edition_id = ?previous_id,
            update_type = %update_type,
            requester = actor.name(),
            "Edition published"
        );
        Ok(published)
    }

    /// Save editor changes and publish in one request.
    ///
    /// A submitted `lock_version` is checked even when nothing else changed,
    /// and the publish only goes ahead on the version this request saved.
    pub async fn save_and_publish(
        &self,
        edition_id: DbId,
        changes: EditionChanges,
        actor: &Actor,
    ) -> Result<Edition, CoreError> {
        let expected_lock_version = if changes.is_empty() {
            changes.lock_version
        } else {
            Some(self.update_draft(edition_id, changes).await?.lock_version)
        };
        self.publish_version(edition_id, expected_lock_version, actor)
            .await
    }

    pub(crate) async fn send_to_publishing_api(
        &self,
        content_id: &str,
        payload: &ContentPayload,
        update_type: UpdateType,
    ) -> Result<(), CoreError> {
        self.publishing_api.put_content(content_id, payload).await?;
        self.publishing_api.publish(content_id, update_type).await
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    /// Append a note to an edition in any state.
    pub async fn add_note(
        &self,
        edition_id: DbId,
        author: &Actor,
        text: &str,
    ) -> Result<Action, CoreError> {
        let note = NewAction::note(author, text)?;
        self.edition(edition_id).await?;
        let action = self
            .store
            .append_action(edition_id, note, self.clock.now())
            .await?;
        tracing::info!(edition_id, requester = author.name(), "Note added");
        Ok(action)
    }
}
