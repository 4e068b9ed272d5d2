//! Editor-submitted changes to a draft and their validation.

use serde::Deserialize;

use crate::edition::{AlertStatus, Edition};
use crate::error::CoreError;
use crate::parts::{normalize_parts, validate_parts, PartInput};
use crate::publishing::AssetUpload;

/// Maximum allowed length for an edition title.
pub const MAX_TITLE_LENGTH: usize = 255;

/// What to do with the image or document slot on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetChange {
    /// Upload a new file and replace the current reference.
    Upload(AssetUpload),
    /// Clear the reference. The asset itself is left in the asset manager.
    Remove,
}

/// Fields an editor may change on a draft. `None` means "leave as is".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditionChanges {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub summary: Option<String>,
    pub change_description: Option<String>,
    pub minor_update: Option<bool>,
    pub alert_status: Option<Vec<AlertStatus>>,
    /// Replaces the whole part list when present.
    pub parts: Option<Vec<PartInput>>,
    /// Lock version the editor loaded; a mismatch is a stale write.
    pub lock_version: Option<i32>,
    #[serde(skip)]
    pub image: Option<AssetChange>,
    #[serde(skip)]
    pub document: Option<AssetChange>,
}

impl EditionChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.overview.is_none()
            && self.summary.is_none()
            && self.change_description.is_none()
            && self.minor_update.is_none()
            && self.alert_status.is_none()
            && self.parts.is_none()
            && self.image.is_none()
            && self.document.is_none()
    }
}

/// Apply text, flag and part changes to a copy of `edition` and validate
/// the result. Asset slots are left for the caller.
///
/// Nothing is written; on error the caller's edition is unchanged.
pub fn apply_changes(edition: &Edition, changes: &EditionChanges) -> Result<Edition, CoreError> {
    edition.ensure_draft("edit")?;

    if let Some(expected) = changes.lock_version {
        if expected != edition.lock_version {
            return Err(CoreError::Conflict(format!(
                "Edition {} has been changed by someone else since it was loaded",
                edition.id
            )));
        }
    }

    let mut updated = edition.clone();
    if let Some(title) = &changes.title {
        updated.title = title.trim().to_string();
    }
    if let Some(overview) = &changes.overview {
        updated.overview = overview.clone();
    }
    if let Some(summary) = &changes.summary {
        updated.summary = summary.clone();
    }
    if let Some(description) = &changes.change_description {
        updated.change_description = description.clone();
    }
    if let Some(minor) = changes.minor_update {
        updated.minor_update = minor;
    }
    if let Some(statuses) = &changes.alert_status {
        updated.alert_status = AlertStatus::normalize(statuses);
    }
    if let Some(parts) = &changes.parts {
        updated.parts = normalize_parts(parts);
    }

    validate_edition(&updated)?;
    Ok(updated)
}

/// Edition-level checks run on every save.
pub fn validate_edition(edition: &Edition) -> Result<(), CoreError> {
    validate_parts(&edition.parts)?;

    if edition.title.is_empty() {
        return Err(CoreError::Validation("Title can't be blank".into()));
    }
    if edition.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    if edition.minor_update && edition.version_number == 1 {
        return Err(CoreError::Validation(
            "The first version cannot be a minor update".into(),
        ));
    }
    Ok(())
}
