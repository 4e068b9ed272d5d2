use axum::routing::{get, post};
use axum::Router;

use crate::handlers::countries;
use crate::state::AppState;

/// Routes mounted at `/countries`.
///
/// ```text
/// GET    /                     list
/// GET    /{slug}               get_by_slug
/// POST   /{slug}/editions      create_edition
/// GET    /{slug}/history       history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(countries::list))
        .route("/{slug}", get(countries::get_by_slug))
        .route("/{slug}/editions", post(countries::create_edition))
        .route("/{slug}/history", get(countries::history))
}
