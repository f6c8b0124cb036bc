use std::path::Path;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("cannot read staged file: {0}")]
    UnreadableFile(#[from] std::io::Error),

    #[error("media host transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("media host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// A stored remote asset: stable URL plus the identifier used for deletion.
#[derive(Debug, Clone)]
pub struct AssetUpload {
    pub url: String,
    pub asset_id: String,
}

/// Remote asset host. Uploads a staged local file and deletes by identifier.
///
/// `destroy` is idempotent from the caller's point of view: deleting an asset
/// that is already gone succeeds.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, local_path: &Path) -> Result<AssetUpload, MediaError>;
    async fn destroy(&self, asset_id: &str) -> Result<(), MediaError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// HTTP client for the hosted media service.
pub struct CloudMediaHost {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl CloudMediaHost {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn parse_upload(body: UploadResponse) -> AssetUpload {
        AssetUpload {
            url: body.secure_url,
            asset_id: body.public_id,
        }
    }
}

#[async_trait]
impl AssetStore for CloudMediaHost {
    async fn upload(&self, local_path: &Path) -> Result<AssetUpload, MediaError> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/upload", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: UploadResponse = response.json().await?;
        tracing::debug!(asset_id = %body.public_id, "uploaded asset to media host");
        Ok(Self::parse_upload(body))
    }

    async fn destroy(&self, asset_id: &str) -> Result<(), MediaError> {
        let response = self
            .http
            .post(format!("{}/destroy", self.base_url))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&serde_json::json!({ "public_id": asset_id }))
            .send()
            .await?;

        let status = response.status();
        // Already-gone assets count as deleted
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(MediaError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
