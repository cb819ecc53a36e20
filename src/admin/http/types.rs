//! Request and response bodies of the admin API.
//!
//! Shared by the server handlers and [`crate::admin::client::AdminClient`].
//! Every success body carries `success: true`; failures use
//! [`ErrorResponse`].

use serde::{Deserialize, Serialize};

use crate::model::{Category, ImageRecord, Project};

/// Error body: `{ "error": "...", "details": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageListResponse {
    pub success: bool,
    pub images: Vec<ImageRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    pub success: bool,
    pub image: ImageRecord,
    /// True when the save created the record rather than editing it.
    #[serde(default)]
    pub created: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectListQuery {
    #[serde(default)]
    pub category: Option<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectListResponse {
    pub success: bool,
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub category: Category,
    /// Project ids in their new display order.
    pub order: Vec<i64>,
}

/// What the image host returned for an upload, plus measured dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub cloudflare_id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub size: u64,
    /// Delivery URL of the first configured variant.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub upload: UploadedFile,
}

/// Public configuration the admin UI needs to build delivery URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfigResponse {
    pub success: bool,
    pub account_hash: String,
    pub delivery_base: String,
    pub variants: Vec<String>,
}
