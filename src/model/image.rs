use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FocalPoint;

/// Metadata of an image stored on the image host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Human-readable key chosen by the editor (e.g. `cedar-house-1`).
    pub id: String,
    /// Identifier assigned by the image host.
    pub cloudflare_id: String,
    /// Account-scoped namespace used in delivery URLs.
    pub account_hash: String,
    #[serde(default)]
    pub focal_point: FocalPoint,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub uploaded_at: DateTime<Utc>,
}

impl ImageRecord {
    /// Aspect ratio (width / height), or `None` when dimensions are unknown.
    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub fn aspect_ratio(&self) -> Option<f64> {
        (self.width > 0 && self.height > 0).then(|| self.width as f64 / self.height as f64)
    }
}

/// Metadata submitted for a freshly uploaded (or edited) image.
///
/// `id` is optional on the wire so a missing key surfaces as a validation
/// error with a readable message rather than a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewImage {
    #[serde(default)]
    pub id: Option<String>,
    pub cloudflare_id: String,
    #[serde(default)]
    pub focal_point: FocalPoint,
    #[serde(default)]
    pub alt: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl NewImage {
    /// Returns the trimmed key, or `None` when it is missing or blank.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}
