use serde::Serialize;

use crate::edition::EditionState;
use crate::types::DbId;

/// A part that failed field-level validation during a draft update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidPart {
    /// 1-based position of the part in the submitted list.
    pub position: usize,
    pub title: String,
    pub errors: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Parts is invalid: {}", describe_invalid_parts(.0))]
    InvalidParts(Vec<InvalidPart>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot {action} edition {edition_id} while it is {state}")]
    InvalidState {
        edition_id: DbId,
        state: EditionState,
        action: &'static str,
    },

    #[error("Publishing failed: {0}")]
    Publishing(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn edition_not_found(id: DbId) -> Self {
        Self::NotFound {
            entity: "edition",
            id: id.to_string(),
        }
    }

    pub fn country_not_found(slug: &str) -> Self {
        Self::NotFound {
            entity: "country",
            id: slug.to_string(),
        }
    }
}

fn describe_invalid_parts(parts: &[InvalidPart]) -> String {
    parts
        .iter()
        .map(|p| format!("part {} ({})", p.position, p.errors.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parts_message_lists_each_part() {
        let err = CoreError::InvalidParts(vec![
            InvalidPart {
                position: 1,
                title: String::new(),
                errors: vec!["title can't be blank".into()],
            },
            InvalidPart {
                position: 3,
                title: "Safety".into(),
                errors: vec!["body can't be blank".into(), "slug can't be blank".into()],
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Parts is invalid: part 1 (title can't be blank); \
             part 3 (body can't be blank, slug can't be blank)"
        );
    }

    #[test]
    fn invalid_state_message_names_the_state() {
        let err = CoreError::InvalidState {
            edition_id: 7,
            state: EditionState::Published,
            action: "edit",
        };
        assert_eq!(err.to_string(), "Cannot edit edition 7 while it is published");
    }
}
