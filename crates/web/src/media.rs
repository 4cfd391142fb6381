use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

use crate::config::MediaConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File uploads are not configured")]
    NotConfigured,

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Uploaded file is {size} bytes, the limit is {max} bytes")]
    TooLarge { size: usize, max: usize },

    #[error("Uploaded file is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("Media host request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Media host answered with status {0}")]
    Status(u16),

    #[error("Media host reply could not be read: {0}")]
    InvalidReply(#[from] serde_json::Error),

    #[error("Media host reply contains no URL")]
    MissingUrl,
}

/// Stores track files and hands back their public URL.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, UploadError>;
}

/// Decode an inline base64 file and check its size before it leaves the process.
pub fn decode_upload(content_base64: &str, max_bytes: usize) -> Result<Vec<u8>, UploadError> {
    let bytes = STANDARD.decode(content_base64.trim())?;

    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    Ok(bytes)
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    secure_url: Option<String>,
    url: Option<String>,
}

/// Public URL from a media host reply, preferring `secure_url` over `url`.
pub fn parse_upload_reply(body: &str) -> Result<String, UploadError> {
    let reply: UploadReply = serde_json::from_str(body)?;

    reply
        .secure_url
        .or(reply.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or(UploadError::MissingUrl)
}

/// Uploads through an unsigned multipart POST.
pub struct HttpMediaHost {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: Option<String>,
}

impl HttpMediaHost {
    pub fn new(upload_url: String, upload_preset: Option<String>) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            upload_url,
            upload_preset,
        })
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        let size = bytes.len();
        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));
        if let Some(ref preset) = self.upload_preset {
            form = form.text("upload_preset", preset.clone());
        }

        tracing::debug!(filename, size, "Uploading track file");

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(filename, status = status.as_u16(), "Media host rejected upload");
            return Err(UploadError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let url = parse_upload_reply(&body)?;

        tracing::info!(filename, size, url = %url, "Track file uploaded");

        Ok(url)
    }
}

/// Used when no upload endpoint is configured; link submissions still work.
pub struct DisabledMediaHost;

#[async_trait]
impl MediaHost for DisabledMediaHost {
    async fn upload(&self, _filename: &str, _bytes: Vec<u8>) -> Result<String, UploadError> {
        Err(UploadError::NotConfigured)
    }
}

pub fn media_host_from_config(config: &MediaConfig) -> Result<Box<dyn MediaHost>, UploadError> {
    match config.upload_url {
        Some(ref url) => Ok(Box::new(HttpMediaHost::new(
            url.clone(),
            config.upload_preset.clone(),
        )?)),
        None => {
            tracing::warn!("MEDIA_UPLOAD_URL not set, file uploads are disabled");
            Ok(Box::new(DisabledMediaHost))
        }
    }
}
