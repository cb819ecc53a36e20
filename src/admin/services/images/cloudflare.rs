//! Cloudflare Images client.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info};

use super::backend::{ImageHost, ImageHostError};
use super::types::{Envelope, UploadedImage};
use crate::constants::IMAGE_API_BASE_URL;

/// Credentials and endpoints for the Cloudflare Images API.
#[derive(Debug, Clone)]
pub struct CloudflareCredentials {
    pub account_id: String,
    pub api_token: String,
    pub account_hash: String,
    /// API base, overridable for tests and proxies.
    pub api_base: String,
}

impl CloudflareCredentials {
    #[must_use]
    pub fn new(
        account_id: impl Into<String>,
        api_token: impl Into<String>,
        account_hash: impl Into<String>,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            api_token: api_token.into(),
            account_hash: account_hash.into(),
            api_base: IMAGE_API_BASE_URL.to_string(),
        }
    }
}

/// Image host backed by Cloudflare Images.
pub struct CloudflareImages {
    client: reqwest::Client,
    credentials: CloudflareCredentials,
}

impl CloudflareImages {
    /// Creates a client with a 60 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend
    /// initialization failure).
    pub fn new(credentials: CloudflareCredentials) -> Result<Self, ImageHostError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn images_url(&self) -> String {
        format!(
            "{}/accounts/{}/images/v1",
            self.credentials.api_base.trim_end_matches('/'),
            self.credentials.account_id
        )
    }
}

/// Turns a non-successful envelope or status into an error.
fn rejected<T>(status: StatusCode, envelope: &Envelope<T>) -> ImageHostError {
    let mut messages: Vec<String> = envelope.errors.iter().map(|e| e.render()).collect();
    if messages.is_empty() {
        messages.push(status.canonical_reason().unwrap_or("unknown error").to_string());
    }
    ImageHostError::Rejected {
        status: status.as_u16(),
        messages,
    }
}

#[async_trait]
impl ImageHost for CloudflareImages {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<UploadedImage, ImageHostError> {
        let size = data.len();
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| ImageHostError::Transport(format!("invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        debug!(filename, size, "Uploading image to Cloudflare");
        let response = self
            .client
            .post(self.images_url())
            .bearer_auth(&self.credentials.api_token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let envelope: Envelope<UploadedImage> = response.json().await?;
        match envelope.result {
            Some(ref image) if envelope.success && status.is_success() => {
                info!(filename, image_id = %image.id, "Image uploaded");
                Ok(image.clone())
            },
            _ => Err(rejected(status, &envelope)),
        }
    }

    async fn delete(&self, image_id: &str) -> Result<(), ImageHostError> {
        let response = self
            .client
            .delete(format!("{}/{image_id}", self.images_url()))
            .bearer_auth(&self.credentials.api_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ImageHostError::NotFound(image_id.to_string()));
        }

        let envelope: Envelope<serde_json::Value> = response.json().await?;
        if envelope.success && status.is_success() {
            info!(image_id, "Image deleted from Cloudflare");
            Ok(())
        } else {
            Err(rejected(status, &envelope))
        }
    }

    fn account_hash(&self) -> &str {
        &self.credentials.account_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images_url_trims_trailing_slash() {
        let mut credentials = CloudflareCredentials::new("acct", "token", "hash");
        credentials.api_base = "http://localhost:9000/".to_string();
        let host = CloudflareImages::new(credentials).unwrap();
        assert_eq!(host.images_url(), "http://localhost:9000/accounts/acct/images/v1");
    }

    #[test]
    fn test_delivery_url() {
        let host = CloudflareImages::new(CloudflareCredentials::new("acct", "t", "Xy9")).unwrap();
        assert_eq!(
            host.delivery_url("abc", "public"),
            "https://imagedelivery.net/Xy9/abc/public"
        );
    }
}
