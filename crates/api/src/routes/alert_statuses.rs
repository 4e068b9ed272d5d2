use axum::routing::get;
use axum::Router;

use crate::handlers::alert_statuses;
use crate::state::AppState;

/// Routes mounted at `/alert-statuses`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(alert_statuses::list))
}
