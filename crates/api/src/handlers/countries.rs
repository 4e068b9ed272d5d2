//! Handlers for the `/countries` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use travel_advice_core::action::VersionHistory;
use travel_advice_core::country::Country;
use travel_advice_core::edition::{Edition, EditionState};
use travel_advice_core::types::{DbId, Timestamp};

use crate::error::AppResult;
use crate::handlers::editions::ActionView;
use crate::middleware::editor::Editor;
use crate::response::DataResponse;
use crate::state::AppState;

/// One row of a country's edition list.
#[derive(Debug, Serialize)]
pub struct EditionSummary {
    pub id: DbId,
    pub version_number: i32,
    pub state: EditionState,
    pub title: String,
    pub published_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl From<&Edition> for EditionSummary {
    fn from(e: &Edition) -> Self {
        Self {
            id: e.id,
            version_number: e.version_number,
            state: e.state,
            title: e.title.clone(),
            published_at: e.published_at,
            updated_at: e.updated_at,
        }
    }
}

/// "Notes for version N" with each action's summary line.
#[derive(Debug, Serialize)]
pub struct VersionHistoryView {
    pub edition_id: DbId,
    pub version_number: i32,
    pub state: EditionState,
    pub actions: Vec<ActionView>,
}

impl From<VersionHistory> for VersionHistoryView {
    fn from(h: VersionHistory) -> Self {
        Self {
            edition_id: h.edition_id,
            version_number: h.version_number,
            state: h.state,
            actions: h.actions.into_iter().map(ActionView::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountryDetail {
    #[serde(flatten)]
    pub country: Country,
    pub editions: Vec<EditionSummary>,
    /// Whether the "create new edition" action is available.
    pub can_create_new_version: bool,
}

/// GET /api/v1/countries
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Country>>>> {
    let countries = state.lifecycle.countries().await?;
    Ok(Json(DataResponse::new(countries)))
}

/// GET /api/v1/countries/{slug}
///
/// The country with its editions, newest version first.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<CountryDetail>>> {
    let country = state.lifecycle.country(&slug).await?;
    let editions = state.lifecycle.editions(&slug).await?;
    let can_create_new_version = state.lifecycle.can_create_new_version(&slug).await?;

    Ok(Json(DataResponse::new(CountryDetail {
        country,
        editions: editions.iter().map(EditionSummary::from).collect(),
        can_create_new_version,
    })))
}

/// POST /api/v1/countries/{slug}/editions
///
/// Create the country's first draft. 409 if a draft or published edition
/// already exists.
pub async fn create_edition(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    editor: Editor,
) -> AppResult<(StatusCode, Json<DataResponse<Edition>>)> {
    let edition = state
        .lifecycle
        .create_initial_edition(&slug, &editor.actor())
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse::new(edition))))
}

/// GET /api/v1/countries/{slug}/history
pub async fn history(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<Vec<VersionHistoryView>>>> {
    let history = state.lifecycle.history(&slug).await?;
    Ok(Json(DataResponse::new(
        history.into_iter().map(VersionHistoryView::from).collect(),
    )))
}
