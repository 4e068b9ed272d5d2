//! Interfaces of the downstream collaborators: the publishing API and the
//! asset manager.
//!
//! HTTP implementations live in `travel-advice-publishing`; in-process
//! fakes for tests live in [`crate::testing`].

use async_trait::async_trait;

use crate::edition::AssetRef;
use crate::error::CoreError;
use crate::payload::{ContentPayload, UpdateType};

/// A file an editor uploaded for the map image or PDF slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Publishing platform client. Both calls must succeed for a publish to
/// count as complete.
#[async_trait]
pub trait PublishingApi: Send + Sync {
    /// Store the draft content for `content_id`.
    async fn put_content(&self, content_id: &str, payload: &ContentPayload)
        -> Result<(), CoreError>;

    /// Make the stored content for `content_id` live.
    async fn publish(&self, content_id: &str, update_type: UpdateType) -> Result<(), CoreError>;
}

/// Asset manager client.
#[async_trait]
pub trait AssetManager: Send + Sync {
    async fn create_asset(&self, upload: AssetUpload) -> Result<AssetRef, CoreError>;

    /// Fetch an asset by its bare id (the last path segment of
    /// [`AssetRef::id`]).
    async fn asset(&self, id: &str) -> Result<AssetRef, CoreError>;
}

/// Asset ids are returned as URLs; lookups take the trailing segment.
pub fn asset_id_from_url(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_id_is_last_path_segment() {
        assert_eq!(
            asset_id_from_url("http://asset-manager.dev.gov.uk/assets/an_image_id"),
            "an_image_id"
        );
        assert_eq!(asset_id_from_url("an_image_id"), "an_image_id");
        assert_eq!(asset_id_from_url("http://host/assets/abc/"), "abc");
    }
}
