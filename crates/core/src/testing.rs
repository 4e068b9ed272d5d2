//! In-process collaborators for tests: a settable clock, a publishing API
//! that records its calls, and an asset manager that hands out canned
//! assets.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::clock::Clock;
use crate::edition::AssetRef;
use crate::error::CoreError;
use crate::payload::{ContentPayload, UpdateType};
use crate::publishing::{asset_id_from_url, AssetManager, AssetUpload, PublishingApi};
use crate::types::Timestamp;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *lock(&self.now) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = lock(&self.now);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *lock(&self.now)
    }
}

// ---------------------------------------------------------------------------
// Publishing API
// ---------------------------------------------------------------------------

/// A call received by [`RecordingPublishingApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum PublishingCall {
    PutContent {
        content_id: String,
        payload: ContentPayload,
    },
    Publish {
        content_id: String,
        update_type: UpdateType,
    },
}

/// Records every call; can be told to fail the next ones.
#[derive(Debug, Default)]
pub struct RecordingPublishingApi {
    calls: Mutex<Vec<PublishingCall>>,
    failure: Mutex<Option<String>>,
}

impl RecordingPublishingApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `message` until [`Self::recover`].
    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    pub fn calls(&self) -> Vec<PublishingCall> {
        lock(&self.calls).clone()
    }

    /// Content ids that received a publish call, in call order.
    pub fn published_content_ids(&self) -> Vec<String> {
        lock(&self.calls)
            .iter()
            .filter_map(|c| match c {
                PublishingCall::Publish { content_id, .. } => Some(content_id.clone()),
                PublishingCall::PutContent { .. } => None,
            })
            .collect()
    }

    /// The last payload sent for `content_id`.
    pub fn last_payload(&self, content_id: &str) -> Option<ContentPayload> {
        lock(&self.calls).iter().rev().find_map(|c| match c {
            PublishingCall::PutContent {
                content_id: id,
                payload,
            } if id == content_id => Some(payload.clone()),
            _ => None,
        })
    }

    fn check_failure(&self) -> Result<(), CoreError> {
        match lock(&self.failure).as_ref() {
            Some(message) => Err(CoreError::Publishing(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PublishingApi for RecordingPublishingApi {
    async fn put_content(
        &self,
        content_id: &str,
        payload: &ContentPayload,
    ) -> Result<(), CoreError> {
        self.check_failure()?;
        lock(&self.calls).push(PublishingCall::PutContent {
            content_id: content_id.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }

    async fn publish(&self, content_id: &str, update_type: UpdateType) -> Result<(), CoreError> {
        self.check_failure()?;
        lock(&self.calls).push(PublishingCall::Publish {
            content_id: content_id.to_string(),
            update_type,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Asset manager
// ---------------------------------------------------------------------------

/// Hands out queued assets in order, or derives one from the upload when
/// the queue is empty.
#[derive(Debug, Default)]
pub struct FakeAssetManager {
    queued: Mutex<VecDeque<AssetRef>>,
    known: Mutex<Vec<AssetRef>>,
    uploads: Mutex<Vec<AssetUpload>>,
}

impl FakeAssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the asset returned by the next `create_asset` call.
    pub fn will_create(&self, asset: AssetRef) {
        lock(&self.queued).push_back(asset);
    }

    pub fn uploads(&self) -> Vec<AssetUpload> {
        lock(&self.uploads).clone()
    }
}

#[async_trait]
impl AssetManager for FakeAssetManager {
    async fn create_asset(&self, upload: AssetUpload) -> Result<AssetRef, CoreError> {
        let asset = lock(&self.queued).pop_front().unwrap_or_else(|| AssetRef {
            id: format!("http://asset-manager.test/assets/{}", upload.filename),
            file_url: format!("http://asset-manager.test/media/{}", upload.filename),
            name: Some(upload.filename.clone()),
        });
        lock(&self.uploads).push(upload);
        lock(&self.known).push(asset.clone());
        Ok(asset)
    }

    async fn asset(&self, id: &str) -> Result<AssetRef, CoreError> {
        lock(&self.known)
            .iter()
            .find(|a| asset_id_from_url(&a.id) == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound {
                entity: "asset",
                id: id.to_string(),
            })
    }
}
