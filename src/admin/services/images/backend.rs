//! Backend trait for the image host.
//!
//! The host is an opaque upload/delete/URL service. Implementations must
//! report failures precisely enough for the API to pass details through to
//! the admin UI.

use async_trait::async_trait;
use bytes::Bytes;

use super::types::UploadedImage;
use crate::constants::DELIVERY_BASE_URL;

/// Failures reported by an image host.
#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    /// The host answered but refused the request.
    #[error("image host rejected the request (status {status}): {}", .messages.join("; "))]
    Rejected { status: u16, messages: Vec<String> },

    /// The image does not exist on the host.
    #[error("image not found on host: {0}")]
    NotFound(String),

    /// The host could not be reached or returned an unreadable response.
    #[error("image host unavailable: {0}")]
    Transport(String),
}

impl ImageHostError {
    /// Details suitable for an API error payload.
    #[must_use]
    pub fn details(&self) -> serde_json::Value {
        match self {
            Self::Rejected { status, messages } => {
                serde_json::json!({ "status": status, "errors": messages })
            },
            Self::NotFound(id) => serde_json::json!({ "image_id": id }),
            Self::Transport(reason) => serde_json::json!({ "reason": reason }),
        }
    }
}

impl From<reqwest::Error> for ImageHostError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// An image CDN that stores originals and serves resized variants.
#[async_trait]
pub trait ImageHost: Send + Sync + 'static {
    /// Uploads a file and returns the host's record of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the file or cannot be reached.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<UploadedImage, ImageHostError>;

    /// Deletes an image by host identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ImageHostError::NotFound`] if the host has no such image,
    /// and other variants for refusals and transport failures.
    async fn delete(&self, image_id: &str) -> Result<(), ImageHostError>;

    /// Account-scoped namespace used in delivery URLs.
    fn account_hash(&self) -> &str;

    /// Public delivery URL of an image variant.
    fn delivery_url(&self, image_id: &str, variant: &str) -> String {
        format!(
            "{DELIVERY_BASE_URL}/{}/{image_id}/{variant}",
            self.account_hash()
        )
    }
}
