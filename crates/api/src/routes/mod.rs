pub mod alert_statuses;
pub mod countries;
pub mod editions;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                  health check
/// /alert-statuses                          alert checkbox values and labels
///
/// /countries                               list
/// /countries/{slug}                        country with editions
/// /countries/{slug}/editions               create first draft (POST)
/// /countries/{slug}/history                actions grouped by version
///
/// /editions/{id}                           get, update draft (PUT)
/// /editions/{id}/new-version               copy into a new draft (POST)
/// /editions/{id}/publish                   publish (POST)
/// /editions/{id}/save-and-publish          update then publish (POST)
/// /editions/{id}/actions                   list actions
/// /editions/{id}/notes                     add note (POST)
/// /editions/{id}/assets                    fresh asset details
/// /editions/{id}/image                     upload (POST multipart), remove (DELETE)
/// /editions/{id}/document                  upload (POST multipart), remove (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/alert-statuses", alert_statuses::router())
        .nest("/countries", countries::router())
        .nest("/editions", editions::router())
}
