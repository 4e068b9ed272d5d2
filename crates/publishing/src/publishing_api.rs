//! Client for the publishing platform's content endpoints.
//!
//! - `PUT  {base}/v2/content/{content_id}` stores the draft content
//! - `POST {base}/v2/content/{content_id}/publish` makes it live

use async_trait::async_trait;
use serde_json::json;
use travel_advice_core::error::CoreError;
use travel_advice_core::payload::{ContentPayload, UpdateType};
use travel_advice_core::publishing::PublishingApi;

use crate::ensure_success;

/// Errors from the publishing API layer.
#[derive(Debug, thiserror::Error)]
pub enum PublishingApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The publishing API returned a non-2xx status code.
    #[error("Publishing API error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

impl From<PublishingApiError> for CoreError {
    fn from(err: PublishingApiError) -> Self {
        CoreError::Publishing(err.to_string())
    }
}

/// HTTP client for the publishing API.
pub struct PublishingApiClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl PublishingApiClient {
    pub fn new(client: reqwest::Client, base_url: String, bearer_token: String) -> Self {
        Self {
            client,
            base_url,
            bearer_token,
        }
    }

    fn content_url(&self, content_id: &str) -> String {
        format!("{}/v2/content/{content_id}", self.base_url)
    }

    pub async fn put_content(
        &self,
        content_id: &str,
        payload: &ContentPayload,
    ) -> Result<(), PublishingApiError> {
        let response = self
            .client
            .put(self.content_url(content_id))
            .bearer_auth(&self.bearer_token)
            .json(payload)
            .send()
            .await?;
        Self::check_status(response).await
    }

    pub async fn publish(
        &self,
        content_id: &str,
        update_type: UpdateType,
    ) -> Result<(), PublishingApiError> {
        let response = self
            .client
            .post(format!("{}/publish", self.content_url(content_id)))
            .bearer_auth(&self.bearer_token)
            .json(&json!({ "update_type": update_type }))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn check_status(response: reqwest::Response) -> Result<(), PublishingApiError> {
        ensure_success(response)
            .await
            .map(|_| ())
            .map_err(|(status, body)| PublishingApiError::ApiError { status, body })
    }
}

#[async_trait]
impl PublishingApi for PublishingApiClient {
    async fn put_content(
        &self,
        content_id: &str,
        payload: &ContentPayload,
    ) -> Result<(), CoreError> {
        PublishingApiClient::put_content(self, content_id, payload)
            .await
            .inspect_err(|e| tracing::error!(content_id, error = %e, "put_content failed"))
            .map_err(CoreError::from)
    }

    async fn publish(&self, content_id: &str, update_type: UpdateType) -> Result<(), CoreError> {
        PublishingApiClient::publish(self, content_id, update_type)
            .await
            .inspect_err(|e| tracing::error!(content_id, error = %e, "publish failed"))
            .map_err(CoreError::from)
    }
}
