//! Client for the asset manager.
//!
//! Uploads are multipart `POST {base}/assets` with the file under
//! `asset[file]`; lookups are `GET {base}/assets/{id}`.

use async_trait::async_trait;
use serde::Deserialize;
use travel_advice_core::edition::AssetRef;
use travel_advice_core::error::CoreError;
use travel_advice_core::publishing::{AssetManager, AssetUpload};

use crate::ensure_success;

/// Errors from the asset manager layer.
#[derive(Debug, thiserror::Error)]
pub enum AssetManagerError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Asset manager error ({status}): {body}")]
    ApiError { status: u16, body: String },
}

impl From<AssetManagerError> for CoreError {
    fn from(err: AssetManagerError) -> Self {
        match err {
            AssetManagerError::ApiError { status: 404, .. } => CoreError::NotFound {
                entity: "asset",
                id: err.to_string(),
            },
            other => CoreError::Publishing(other.to_string()),
        }
    }
}

/// Asset manager response body. Only the fields we keep are read.
#[derive(Debug, Deserialize)]
struct AssetResponse {
    id: String,
    file_url: String,
    name: Option<String>,
}

impl From<AssetResponse> for AssetRef {
    fn from(body: AssetResponse) -> Self {
        AssetRef {
            id: body.id,
            file_url: body.file_url,
            name: body.name,
        }
    }
}

/// HTTP client for the asset manager.
pub struct AssetManagerClient {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl AssetManagerClient {
    pub fn new(client: reqwest::Client, base_url: String, bearer_token: String) -> Self {
        Self {
            client,
            base_url,
            bearer_token,
        }
    }

    pub async fn create_asset(&self, upload: AssetUpload) -> Result<AssetRef, AssetManagerError> {
        let part = reqwest::multipart::Part::bytes(upload.bytes)
            .file_name(upload.filename)
            .mime_str(&upload.content_type)?;
        let form = reqwest::multipart::Form::new().part("asset[file]", part);

        let response = self
            .client
            .post(format!("{}/assets", self.base_url))
            .bearer_auth(&self.bearer_token)
            .multipart(form)
            .send()
            .await?;
        Self::parse_asset(response).await
    }

    pub async fn asset(&self, id: &str) -> Result<AssetRef, AssetManagerError> {
        let response = self
            .client
            .get(format!("{}/assets/{id}", self.base_url))
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;
        Self::parse_asset(response).await
    }

    async fn parse_asset(response: reqwest::Response) -> Result<AssetRef, AssetManagerError> {
        let response = ensure_success(response)
            .await
            .map_err(|(status, body)| AssetManagerError::ApiError { status, body })?;
        Ok(response.json::<AssetResponse>().await?.into())
    }
}

#[async_trait]
impl AssetManager for AssetManagerClient {
    async fn create_asset(&self, upload: AssetUpload) -> Result<AssetRef, CoreError> {
        let filename = upload.filename.clone();
        AssetManagerClient::create_asset(self, upload)
            .await
            .inspect_err(|e| tracing::error!(filename = %filename, error = %e, "Asset upload failed"))
            .map_err(CoreError::from)
    }

    async fn asset(&self, id: &str) -> Result<AssetRef, CoreError> {
        AssetManagerClient::asset(self, id)
            .await
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_response_maps_to_asset_ref() {
        let body: AssetResponse = serde_json::from_value(serde_json::json!({
            "id": "http://asset-manager.dev.gov.uk/assets/an_image_id",
            "name": "image.jpg",
            "content_type": "image/jpeg",
            "file_url": "http://asset-manager.dev.gov.uk/media/an_image_id/image.jpg",
            "state": "uploaded"
        }))
        .unwrap();
        let asset = AssetRef::from(body);
        assert_eq!(asset.name.as_deref(), Some("image.jpg"));
        assert!(asset.file_url.ends_with("/image.jpg"));
    }

    #[test]
    fn missing_asset_is_not_found() {
        let err = AssetManagerError::ApiError {
            status: 404,
            body: "not found".into(),
        };
        assert!(matches!(
            CoreError::from(err),
            CoreError::NotFound { entity: "asset", .. }
        ));
    }

    #[test]
    fn server_error_is_publishing_error() {
        let err = AssetManagerError::ApiError {
            status: 503,
            body: "down".into(),
        };
        assert!(matches!(CoreError::from(err), CoreError::Publishing(_)));
    }
}
