//! Handlers for the `/editions` resource.
//!
//! Reads are open; every write requires an [`Editor`].

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use travel_advice_core::action::Action;
use travel_advice_core::changes::{AssetChange, EditionChanges};
use travel_advice_core::edition::Edition;
use travel_advice_core::lifecycle::EditionAssets;
use travel_advice_core::publishing::AssetUpload;
use travel_advice_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::editor::Editor;
use crate::response::DataResponse;
use crate::state::AppState;

/// An edition as shown in the editor.
#[derive(Debug, Serialize)]
pub struct EditionView {
    #[serde(flatten)]
    pub edition: Edition,
    /// Published and archived editions cannot be edited.
    pub read_only: bool,
    /// "Preview saved version" link on the draft stack.
    pub preview_url: String,
}

impl From<Edition> for EditionView {
    fn from(edition: Edition) -> Self {
        Self {
            read_only: edition.is_read_only(),
            preview_url: edition.preview_path(),
            edition,
        }
    }
}

/// An action with its one-line history summary, e.g. "Publish by Joe Bloggs".
#[derive(Debug, Serialize)]
pub struct ActionView {
    #[serde(flatten)]
    pub action: Action,
    pub summary: String,
}

impl From<Action> for ActionView {
    fn from(action: Action) -> Self {
        Self {
            summary: action.summary(),
            action,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNote {
    pub comment: String,
}

/// Which asset slot an upload or removal targets.
#[derive(Debug, Clone, Copy)]
enum AssetSlot {
    Image,
    Document,
}

impl AssetSlot {
    fn changes(self, change: AssetChange, lock_version: Option<i32>) -> EditionChanges {
        let mut changes = EditionChanges {
            lock_version,
            ..Default::default()
        };
        match self {
            Self::Image => changes.image = Some(change),
            Self::Document => changes.document = Some(change),
        }
        changes
    }
}

type EditionResponse = AppResult<Json<DataResponse<EditionView>>>;

fn respond(edition: Edition) -> Json<DataResponse<EditionView>> {
    Json(DataResponse::new(EditionView::from(edition)))
}

/// GET /api/v1/editions/{id}
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<DbId>) -> EditionResponse {
    Ok(respond(state.lifecycle.edition(id).await?))
}

/// PUT /api/v1/editions/{id}
///
/// Apply changes to a draft. 409 on a non-draft or a stale `lock_version`,
/// 400 with per-part `details` when parts are invalid.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
    Json(changes): Json<EditionChanges>,
) -> EditionResponse {
    tracing::debug!(edition_id = id, editor = %editor.name, "Updating edition");
    Ok(respond(state.lifecycle.update_draft(id, changes).await?))
}

/// POST /api/v1/editions/{id}/new-version
pub async fn create_new_version(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
) -> AppResult<(StatusCode, Json<DataResponse<EditionView>>)> {
    let edition = state
        .lifecycle
        .create_new_version(id, &editor.actor())
        .await?;
    Ok((StatusCode::CREATED, respond(edition)))
}

/// POST /api/v1/editions/{id}/publish
pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
) -> EditionResponse {
    Ok(respond(state.lifecycle.publish(id, &editor.actor()).await?))
}

/// POST /api/v1/editions/{id}/save-and-publish
pub async fn save_and_publish(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
    Json(changes): Json<EditionChanges>,
) -> EditionResponse {
    let edition = state
        .lifecycle
        .save_and_publish(id, changes, &editor.actor())
        .await?;
    Ok(respond(edition))
}

/// GET /api/v1/editions/{id}/actions
pub async fn list_actions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ActionView>>>> {
    let actions = state.lifecycle.actions(id).await?;
    Ok(Json(DataResponse::new(
        actions.into_iter().map(ActionView::from).collect(),
    )))
}

/// POST /api/v1/editions/{id}/notes
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
    Json(input): Json<CreateNote>,
) -> AppResult<(StatusCode, Json<DataResponse<ActionView>>)> {
    let action = state
        .lifecycle
        .add_note(id, &editor.actor(), &input.comment)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(ActionView::from(action))),
    ))
}

/// GET /api/v1/editions/{id}/assets
///
/// Fresh details of the edition's image and document from the asset manager.
pub async fn assets(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EditionAssets>>> {
    Ok(Json(DataResponse::new(state.lifecycle.edition_assets(id).await?)))
}

/// POST /api/v1/editions/{id}/image
///
/// Multipart form with a required `file` field and an optional
/// `lock_version` field.
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
    multipart: Multipart,
) -> EditionResponse {
    upload(state, id, editor, multipart, AssetSlot::Image).await
}

/// DELETE /api/v1/editions/{id}/image
pub async fn remove_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
) -> EditionResponse {
    remove(state, id, editor, AssetSlot::Image).await
}

/// POST /api/v1/editions/{id}/document
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
    multipart: Multipart,
) -> EditionResponse {
    upload(state, id, editor, multipart, AssetSlot::Document).await
}

/// DELETE /api/v1/editions/{id}/document
pub async fn remove_document(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    editor: Editor,
) -> EditionResponse {
    remove(state, id, editor, AssetSlot::Document).await
}

async fn upload(
    state: AppState,
    id: DbId,
    editor: Editor,
    mut multipart: Multipart,
    slot: AssetSlot,
) -> EditionResponse {
    let mut file: Option<AssetUpload> = None;
    let mut lock_version: Option<i32> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some(AssetUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "lock_version" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let parsed = text.trim().parse().map_err(|_| {
                    AppError::BadRequest(format!("Invalid lock_version '{text}'"))
                })?;
                lock_version = Some(parsed);
            }
            _ => {} // ignore unknown fields
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    tracing::info!(
        edition_id = id,
        editor = %editor.name,
        filename = %file.filename,
        slot = ?slot,
        "Uploading edition asset"
    );
    let changes = slot.changes(AssetChange::Upload(file), lock_version);
    Ok(respond(state.lifecycle.update_draft(id, changes).await?))
}

async fn remove(state: AppState, id: DbId, editor: Editor, slot: AssetSlot) -> EditionResponse {
    tracing::info!(edition_id = id, editor = %editor.name, slot = ?slot, "Removing edition asset");
    let changes = slot.changes(AssetChange::Remove, None);
    Ok(respond(state.lifecycle.update_draft(id, changes).await?))
}
