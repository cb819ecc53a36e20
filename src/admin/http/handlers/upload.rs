//! Upload handler.
//!
//! Accepts a multipart form with a single `file` field, checks that it is
//! a decodable image, forwards it to the image host and reports what the
//! host stored. The catalog is not touched; the admin UI saves metadata in
//! a second call once the editor has picked a key.

use axum::{
    Json,
    extract::{Multipart, State},
};
use bytes::Bytes;
use tracing::info;

use super::super::types::{UploadResponse, UploadedFile};
use super::super::{AppError, SharedState, metrics};
use crate::admin::services::images::read_dimensions;
use crate::constants::MAX_UPLOAD_BYTES;
use crate::utils::format_bytes;

/// POST /api/upload - Upload one image file to the image host.
pub(crate) async fn upload(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    metrics::record_operation("upload", "upload");

    let mut file: Option<(String, String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(AppError::BadRequest(
                "Only one file may be uploaded per request".to_string(),
            ));
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(&filename)
                    .first_or_octet_stream()
                    .to_string()
            });
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
        file = Some((filename, content_type, data));
    }

    let (filename, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing 'file' field".to_string()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
    }
    if data.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::BadRequest(format!(
            "File is {}, the limit is {}",
            format_bytes(data.len() as u64),
            format_bytes(MAX_UPLOAD_BYTES as u64)
        )));
    }

    let (width, height) = read_dimensions(&data)
        .map_err(|e| AppError::BadRequest(format!("Not a supported image: {e}")))?;
    let size = data.len() as u64;

    let uploaded = state.images.upload(&filename, &content_type, data).await?;
    metrics::record_upload_bytes(size);
    info!(
        %filename,
        cloudflare_id = %uploaded.id,
        width,
        height,
        size = %format_bytes(size),
        "Upload accepted"
    );

    Ok(Json(UploadResponse {
        success: true,
        upload: UploadedFile {
            url: state.images.default_url(&uploaded.id),
            cloudflare_id: uploaded.id,
            filename,
            width,
            height,
            size,
        },
    }))
}
