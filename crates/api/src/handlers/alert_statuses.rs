//! Alert status choices for the edition form.

use axum::Json;
use serde::Serialize;
use travel_advice_core::edition::AlertStatus;

use crate::response::DataResponse;

#[derive(Debug, Serialize)]
pub struct AlertStatusOption {
    pub value: AlertStatus,
    pub label: &'static str,
}

/// GET /api/v1/alert-statuses
pub async fn list() -> Json<DataResponse<Vec<AlertStatusOption>>> {
    let options = AlertStatus::ALL
        .into_iter()
        .map(|value| AlertStatusOption {
            label: value.label(),
            value,
        })
        .collect();
    Json(DataResponse::new(options))
}
