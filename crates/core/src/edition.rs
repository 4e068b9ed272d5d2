//! Editions, their states and the pure state transitions between them.
//!
//! An edition is one versioned instance of a country's travel advice.
//! Only drafts may be edited; publishing a draft archives the country's
//! previously published edition.

use serde::{Deserialize, Serialize};

use crate::country::BASE_PATH;
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Lifecycle state of an edition.
///
/// `draft --publish--> published --(newer publish)--> archived`. Archived is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditionState {
    Draft,
    Published,
    Archived,
}

impl EditionState {
    /// String representation for logging and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            other => Err(CoreError::Validation(format!(
                "Unknown edition state '{other}'"
            ))),
        }
    }

    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(&self, next: EditionState) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Published) | (Self::Published, Self::Archived)
        )
    }
}

impl std::fmt::Display for EditionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Alert status
// ---------------------------------------------------------------------------

/// FCO travel alert flags an edition may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    AvoidAllButEssentialTravelToParts,
    AvoidAllTravelToParts,
    AvoidAllButEssentialTravelToWholeCountry,
    AvoidAllTravelToWholeCountry,
}

impl AlertStatus {
    pub const ALL: [AlertStatus; 4] = [
        Self::AvoidAllButEssentialTravelToParts,
        Self::AvoidAllTravelToParts,
        Self::AvoidAllButEssentialTravelToWholeCountry,
        Self::AvoidAllTravelToWholeCountry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AvoidAllButEssentialTravelToParts => "avoid_all_but_essential_travel_to_parts",
            Self::AvoidAllTravelToParts => "avoid_all_travel_to_parts",
            Self::AvoidAllButEssentialTravelToWholeCountry => {
                "avoid_all_but_essential_travel_to_whole_country"
            }
            Self::AvoidAllTravelToWholeCountry => "avoid_all_travel_to_whole_country",
        }
    }

    /// Checkbox label shown to editors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AvoidAllButEssentialTravelToParts => {
                "The FCO advise against all but essential travel to parts of the country"
            }
            Self::AvoidAllTravelToParts => {
                "The FCO advise against all travel to parts of the country"
            }
            Self::AvoidAllButEssentialTravelToWholeCountry => {
                "The FCO advise against all but essential travel to the whole country"
            }
            Self::AvoidAllTravelToWholeCountry => {
                "The FCO advise against all travel to the whole country"
            }
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or_else(|| CoreError::Validation(format!("Unknown alert status '{value}'")))
    }

    /// De-duplicate and sort into declaration order.
    pub fn normalize(statuses: &[AlertStatus]) -> Vec<AlertStatus> {
        let mut out = statuses.to_vec();
        out.sort();
        out.dedup();
        out
    }
}

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Reference to a file held by the asset manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    pub file_url: String,
    pub name: Option<String>,
}

/// An ordered body section of an edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub title: String,
    pub slug: String,
    pub body: String,
    /// 1-based, contiguous, matches list position.
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edition {
    pub id: DbId,
    pub country_slug: String,
    pub version_number: i32,
    pub state: EditionState,
    pub title: String,
    pub overview: String,
    pub summary: String,
    pub change_description: String,
    pub minor_update: bool,
    pub alert_status: Vec<AlertStatus>,
    pub parts: Vec<Part>,
    pub image: Option<AssetRef>,
    pub document: Option<AssetRef>,
    pub published_at: Option<Timestamp>,
    /// Bumped on every write; a save carrying a stale value is rejected.
    pub lock_version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Content of a draft about to be inserted. Ids, version numbers and
/// timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEdition {
    pub country_slug: String,
    pub title: String,
    pub overview: String,
    pub summary: String,
    pub change_description: String,
    pub minor_update: bool,
    pub alert_status: Vec<AlertStatus>,
    pub parts: Vec<Part>,
    pub image: Option<AssetRef>,
    pub document: Option<AssetRef>,
}

impl NewEdition {
    /// An empty draft with only a title.
    pub fn blank(country_slug: &str, title: &str) -> Self {
        Self {
            country_slug: country_slug.to_string(),
            title: title.to_string(),
            overview: String::new(),
            summary: String::new(),
            change_description: String::new(),
            minor_update: false,
            alert_status: Vec::new(),
            parts: Vec::new(),
            image: None,
            document: None,
        }
    }

    /// Materialize as a stored draft.
    pub fn into_edition(self, id: DbId, version_number: i32, now: Timestamp) -> Edition {
        Edition {
            id,
            country_slug: self.country_slug,
            version_number,
            state: EditionState::Draft,
            title: self.title,
            overview: self.overview,
            summary: self.summary,
            change_description: self.change_description,
            minor_update: self.minor_update,
            alert_status: self.alert_status,
            parts: self.parts,
            image: self.image,
            document: self.document,
            published_at: None,
            lock_version: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Edition {
    pub fn is_draft(&self) -> bool {
        self.state == EditionState::Draft
    }

    /// Published and archived editions are shown read-only.
    pub fn is_read_only(&self) -> bool {
        !self.is_draft()
    }

    /// Path of this version on the draft preview stack.
    pub fn preview_path(&self) -> String {
        format!(
            "{BASE_PATH}/{}?edition={}",
            self.country_slug, self.version_number
        )
    }

    /// Fail with [`CoreError::InvalidState`] unless this edition is a draft.
    pub fn ensure_draft(&self, action: &'static str) -> Result<(), CoreError> {
        if self.is_draft() {
            Ok(())
        } else {
            Err(CoreError::InvalidState {
                edition_id: self.id,
                state: self.state,
                action,
            })
        }
    }

    /// Deep copy of this edition's content into a fresh draft.
    ///
    /// Change description and the minor update flag start blank.
    pub fn to_new_draft(&self) -> NewEdition {
        NewEdition {
            country_slug: self.country_slug.clone(),
            title: self.title.clone(),
            overview: self.overview.clone(),
            summary: self.summary.clone(),
            change_description: String::new(),
            minor_update: false,
            alert_status: self.alert_status.clone(),
            parts: self.parts.clone(),
            image: self.image.clone(),
            document: self.document.clone(),
        }
    }

    /// Compute this draft as it will look once published.
    ///
    /// A minor update keeps the previous edition's `published_at` and
    /// change description; anything else is stamped with `now` and must
    /// carry its own change description.
    pub fn prepare_publication(
        &self,
        previous: Option<&Edition>,
        now: Timestamp,
    ) -> Result<Edition, CoreError> {
        self.ensure_draft("publish")?;

        if !self.minor_update && self.change_description.trim().is_empty() {
            return Err(CoreError::Validation(
                "Change description can't be blank unless this is a minor update".into(),
            ));
        }

        let mut published = self.clone();
        published.state = EditionState::Published;
        published.published_at = Some(now);

        if self.minor_update {
            if let Some(prev) = previous {
                published.published_at = prev.published_at.or(Some(now));
                published.change_description = prev.change_description.clone();
            }
        }
        Ok(published)
    }

    /// The edition as it looks after a newer edition has been published.
    pub fn archived(&self) -> Result<Edition, CoreError> {
        if !self.state.can_transition_to(EditionState::Archived) {
            return Err(CoreError::InvalidState {
                edition_id: self.id,
                state: self.state,
                action: "archive",
            });
        }
        let mut archived = self.clone();
        archived.state = EditionState::Archived;
        Ok(archived)
    }
}
