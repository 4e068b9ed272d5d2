//! Append-only action trail recorded against editions.
//!
//! Actions are never updated or deleted once written. The history view
//! groups them by edition version.

use serde::{Deserialize, Serialize};

use crate::edition::{Edition, EditionState};
use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Display name used when an action is triggered non-interactively.
pub const SYSTEM_ACTOR_NAME: &str = "GOV.UK Bot";

/// Comment recorded on the publish action of a minor update.
pub const MINOR_UPDATE_COMMENT: &str = "Minor update";

/// Maximum length of a note comment.
pub const MAX_NOTE_LENGTH: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    NewVersion,
    Publish,
    Note,
}

impl ActionType {
    /// String representation for logging and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewVersion => "new_version",
            Self::Publish => "publish",
            Self::Note => "note",
        }
    }

    /// Human label used in the history view.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewVersion => "New version",
            Self::Publish => "Publish",
            Self::Note => "Note",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "new_version" => Ok(Self::NewVersion),
            "publish" => Ok(Self::Publish),
            "note" => Ok(Self::Note),
            other => Err(CoreError::Validation(format!(
                "Unknown action type '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performed an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Editor(String),
    System,
}

impl Actor {
    pub fn editor(name: impl Into<String>) -> Self {
        Self::Editor(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Editor(name) => name,
            Self::System => SYSTEM_ACTOR_NAME,
        }
    }
}

/// A stored action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub id: DbId,
    pub edition_id: DbId,
    pub request_type: ActionType,
    pub requester: String,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

impl Action {
    /// One-line summary such as `"Publish by Joe Bloggs"`.
    pub fn summary(&self) -> String {
        format!("{} by {}", self.request_type.label(), self.requester)
    }
}

/// An action about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAction {
    pub request_type: ActionType,
    pub requester: String,
    pub comment: Option<String>,
}

impl NewAction {
    pub fn new_version(actor: &Actor) -> Self {
        Self {
            request_type: ActionType::NewVersion,
            requester: actor.name().to_string(),
            comment: None,
        }
    }

    /// Publish action; minor updates get a fixed comment instead of the
    /// change description.
    pub fn publish(actor: &Actor, edition: &Edition) -> Self {
        let comment = if edition.minor_update {
            MINOR_UPDATE_COMMENT.to_string()
        } else {
            edition.change_description.clone()
        };
        Self {
            request_type: ActionType::Publish,
            requester: actor.name().to_string(),
            comment: Some(comment),
        }
    }

    pub fn note(actor: &Actor, text: &str) -> Result<Self, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::Validation("Note must not be empty".into()));
        }
        if text.chars().count() > MAX_NOTE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Note must be at most {MAX_NOTE_LENGTH} characters"
            )));
        }
        Ok(Self {
            request_type: ActionType::Note,
            requester: actor.name().to_string(),
            comment: Some(text.to_string()),
        })
    }
}

/// The actions of one edition, as shown under "Notes for version N".
#[derive(Debug, Clone, Serialize)]
pub struct VersionHistory {
    pub edition_id: DbId,
    pub version_number: i32,
    pub state: EditionState,
    pub actions: Vec<Action>,
}

/// Group actions under their editions, newest version first, each
/// version's actions in creation order.
pub fn group_history(editions: &[Edition], actions: Vec<Action>) -> Vec<VersionHistory> {
    let mut history: Vec<VersionHistory> = editions
        .iter()
        .map(|e| VersionHistory {
            edition_id: e.id,
            version_number: e.version_number,
            state: e.state,
            actions: Vec::new(),
        })
        .collect();
    history.sort_by(|a, b| b.version_number.cmp(&a.version_number));

    for action in actions {
        if let Some(entry) = history.iter_mut().find(|h| h.edition_id == action.edition_id) {
            entry.actions.push(action);
        }
    }
    for entry in &mut history {
        entry.actions.sort_by_key(|a| (a.created_at, a.id));
    }
    history
}
