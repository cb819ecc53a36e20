//! In-memory image host.
//!
//! Keeps uploads in a `DashMap`. Used when no Cloudflare credentials are
//! configured and by tests, which can make uploads or deletes fail on
//! demand to exercise the API's ordering guarantees.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use super::backend::{ImageHost, ImageHostError};
use super::types::UploadedImage;

#[derive(Debug, Clone)]
struct StoredImage {
    filename: String,
    size: usize,
}

/// Image host that never leaves the process.
#[derive(Debug, Default)]
pub struct MemoryImageHost {
    account_hash: String,
    images: DashMap<String, StoredImage>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryImageHost {
    #[must_use]
    pub fn new(account_hash: impl Into<String>) -> Self {
        Self {
            account_hash: account_hash.into(),
            ..Default::default()
        }
    }

    /// Makes subsequent uploads fail with a rejection.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent deletes fail with a rejection.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Returns true if an image with this host id is stored.
    #[must_use]
    pub fn contains(&self, image_id: &str) -> bool {
        self.images.contains_key(image_id)
    }

    /// Number of stored images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Size in bytes of a stored image.
    #[must_use]
    pub fn size_of(&self, image_id: &str) -> Option<usize> {
        self.images.get(image_id).map(|entry| entry.size)
    }
}

#[async_trait]
impl ImageHost for MemoryImageHost {
    async fn upload(
        &self,
        filename: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<UploadedImage, ImageHostError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ImageHostError::Rejected {
                status: 500,
                messages: vec!["upload disabled".to_string()],
            });
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.images.insert(
            id.clone(),
            StoredImage {
                filename: filename.to_string(),
                size: data.len(),
            },
        );
        Ok(UploadedImage {
            variants: vec![self.delivery_url(&id, "public")],
            id,
            filename: filename.to_string(),
            uploaded: Some(Utc::now()),
        })
    }

    async fn delete(&self, image_id: &str) -> Result<(), ImageHostError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ImageHostError::Rejected {
                status: 500,
                messages: vec!["delete disabled".to_string()],
            });
        }
        match self.images.remove(image_id) {
            Some((_, stored)) => {
                tracing::debug!(image_id, filename = %stored.filename, "Image removed from memory host");
                Ok(())
            },
            None => Err(ImageHostError::NotFound(image_id.to_string())),
        }
    }

    fn account_hash(&self) -> &str {
        &self.account_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_delete() {
        let host = MemoryImageHost::new("hash");
        let uploaded = host
            .upload("a.jpg", "image/jpeg", Bytes::from_static(b"jpeg"))
            .await
            .unwrap();
        assert!(host.contains(&uploaded.id));
        assert_eq!(host.size_of(&uploaded.id), Some(4));
        assert!(uploaded.variants[0].ends_with("/public"));

        host.delete(&uploaded.id).await.unwrap();
        assert!(host.is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let host = MemoryImageHost::new("hash");
        let err = host.delete("nope").await.unwrap_err();
        assert!(matches!(err, ImageHostError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failure_switches() {
        let host = MemoryImageHost::new("hash");
        host.set_fail_uploads(true);
        assert!(host.upload("a.jpg", "image/jpeg", Bytes::new()).await.is_err());

        host.set_fail_uploads(false);
        let uploaded = host.upload("a.jpg", "image/jpeg", Bytes::new()).await.unwrap();
        host.set_fail_deletes(true);
        assert!(host.delete(&uploaded.id).await.is_err());
        assert!(host.contains(&uploaded.id));
    }
}
