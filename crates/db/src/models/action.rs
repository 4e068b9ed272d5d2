//! Action rows.

use sqlx::FromRow;
use travel_advice_core::action::{Action, ActionType};
use travel_advice_core::error::CoreError;
use travel_advice_core::types::{DbId, Timestamp};

/// A row from the `actions` table.
#[derive(Debug, Clone, FromRow)]
pub struct ActionRow {
    pub id: DbId,
    pub edition_id: DbId,
    pub request_type: String,
    pub requester: String,
    pub comment: Option<String>,
    pub created_at: Timestamp,
}

impl TryFrom<ActionRow> for Action {
    type Error = CoreError;

    fn try_from(row: ActionRow) -> Result<Self, Self::Error> {
        Ok(Action {
            id: row.id,
            edition_id: row.edition_id,
            request_type: ActionType::parse(&row.request_type)?,
            requester: row.requester,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}
