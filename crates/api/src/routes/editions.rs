use axum::routing::{get, post};
use axum::Router;

use crate::handlers::editions;
use crate::state::AppState;

/// Routes mounted at `/editions`.
///
/// ```text
/// GET    /{id}                     get_by_id
/// PUT    /{id}                     update
/// POST   /{id}/new-version         create_new_version
/// POST   /{id}/publish             publish
/// POST   /{id}/save-and-publish    save_and_publish
/// GET    /{id}/actions             list_actions
/// POST   /{id}/notes               add_note
/// GET    /{id}/assets              assets
/// POST   /{id}/image               upload_image (multipart)
/// DELETE /{id}/image               remove_image
/// POST   /{id}/document            upload_document (multipart)
/// DELETE /{id}/document            remove_document
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(editions::get_by_id).put(editions::update))
        .route("/{id}/new-version", post(editions::create_new_version))
        .route("/{id}/publish", post(editions::publish))
        .route("/{id}/save-and-publish", post(editions::save_and_publish))
        .route("/{id}/actions", get(editions::list_actions))
        .route("/{id}/notes", post(editions::add_note))
        .route("/{id}/assets", get(editions::assets))
        .route(
            "/{id}/image",
            post(editions::upload_image).delete(editions::remove_image),
        )
        .route(
            "/{id}/document",
            post(editions::upload_document).delete(editions::remove_document),
        )
}
