//! Image host service.
//!
//! Uploads originals to the image CDN, deletes them, and builds public
//! delivery URLs. The host is treated as opaque; only the calls below are
//! used.
//!
//! # Example
//!
//! ```ignore
//! use folio::admin::services::images::ImageHostService;
//!
//! let host = ImageHostService::memory("dev-hash");
//! let uploaded = host.upload("cedar-01.jpg", "image/jpeg", bytes).await?;
//! let url = host.delivery_url(&uploaded.id, "public");
//! ```

mod backend;
mod cloudflare;
mod memory;
mod types;

use bytes::Bytes;
use std::io::Cursor;
use std::sync::Arc;

pub use backend::{ImageHost, ImageHostError};
pub use cloudflare::{CloudflareCredentials, CloudflareImages};
pub use memory::MemoryImageHost;
pub use types::UploadedImage;

use crate::constants::DEFAULT_VARIANT;

/// Reads pixel dimensions from an encoded image's header.
///
/// # Errors
///
/// Returns an error if the format is unknown or the header is unreadable.
pub fn read_dimensions(data: &[u8]) -> image::ImageResult<(u32, u32)> {
    image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
}

/// Cloneable handle over an [`ImageHost`] plus the configured variants.
#[derive(Clone)]
pub struct ImageHostService {
    host: Arc<dyn ImageHost>,
    variants: Vec<String>,
}

impl ImageHostService {
    /// Creates a service backed by Cloudflare Images.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn cloudflare(
        credentials: CloudflareCredentials,
        variants: Vec<String>,
    ) -> Result<Self, ImageHostError> {
        Ok(Self::custom(CloudflareImages::new(credentials)?).with_variants(variants))
    }

    /// Creates a service backed by an in-memory host.
    #[must_use]
    pub fn memory(account_hash: impl Into<String>) -> Self {
        Self::custom(MemoryImageHost::new(account_hash))
    }

    /// Creates a service sharing an existing host, so tests can keep a
    /// handle on it.
    #[must_use]
    pub fn shared<H: ImageHost>(host: Arc<H>) -> Self {
        Self {
            host,
            variants: vec![DEFAULT_VARIANT.to_string()],
        }
    }

    /// Creates a service with a custom host implementation.
    pub fn custom<H: ImageHost>(host: H) -> Self {
        Self::shared(Arc::new(host))
    }

    /// Replaces the variant list; an empty list keeps the default variant.
    #[must_use]
    pub fn with_variants(mut self, variants: Vec<String>) -> Self {
        if !variants.is_empty() {
            self.variants = variants;
        }
        self
    }

    /// Uploads a file to the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the file or is unreachable.
    pub async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<UploadedImage, ImageHostError> {
        self.host.upload(filename, content_type, data).await
    }

    /// Deletes an image from the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses, has no such image, or is
    /// unreachable.
    pub async fn delete(&self, image_id: &str) -> Result<(), ImageHostError> {
        self.host.delete(image_id).await
    }

    #[must_use]
    pub fn account_hash(&self) -> &str {
        self.host.account_hash()
    }

    #[must_use]
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Delivery URL of an image for the given variant.
    #[must_use]
    pub fn delivery_url(&self, image_id: &str, variant: &str) -> String {
        self.host.delivery_url(image_id, variant)
    }

    /// Delivery URL using the first configured variant.
    #[must_use]
    pub fn default_url(&self, image_id: &str) -> String {
        let variant = self
            .variants
            .first()
            .map_or(DEFAULT_VARIANT, String::as_str);
        self.delivery_url(image_id, variant)
    }
}
