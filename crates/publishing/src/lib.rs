//! HTTP clients for the publishing platform and the asset manager.
//!
//! Both clients implement the collaborator traits from
//! `travel_advice_core::publishing`, converting their own errors into
//! `CoreError::Publishing` at that boundary.

pub mod asset_manager;
pub mod config;
pub mod publishing_api;

use std::time::Duration;

pub use asset_manager::{AssetManagerClient, AssetManagerError};
pub use config::DownstreamConfig;
pub use publishing_api::{PublishingApiClient, PublishingApiError};

/// Timeout for a single downstream request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared HTTP client used by both downstream clients.
pub fn build_http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Return the response if its status is 2xx, otherwise its status and body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, (u16, String)> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    Err((status.as_u16(), body))
}
