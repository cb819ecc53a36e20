//! Image record handlers.
//!
//! Listing, fetching, saving metadata (upsert by key) and deleting. Delete
//! refuses images still used by a project, then removes the asset from the
//! image host first and only then drops the catalog record.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::warn;

use super::super::audit::{AuditEvent, log_audit_event};
use super::super::types::{DeleteResponse, ImageListResponse, ImageResponse};
use super::super::{ApiJson, AppError, SharedState, metrics};
use crate::admin::services::images::ImageHostError;
use crate::model::NewImage;

/// GET /api/images - List all image records.
pub(crate) async fn list_images(
    State(state): State<SharedState>,
) -> Result<Json<ImageListResponse>, AppError> {
    metrics::record_operation("images", "list");
    let images = state.catalog.list_images().await?;
    Ok(Json(ImageListResponse {
        success: true,
        images,
    }))
}

/// GET /api/images/{id} - Get one image record.
pub(crate) async fn get_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ImageResponse>, AppError> {
    metrics::record_operation("images", "get");
    let image = state
        .catalog
        .get_image(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image '{id}' not found")))?;
    Ok(Json(ImageResponse {
        success: true,
        image,
        created: false,
    }))
}

/// POST /api/images - Save image metadata after an upload, or edit it.
pub(crate) async fn save_image(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<NewImage>,
) -> Result<(StatusCode, Json<ImageResponse>), AppError> {
    metrics::record_operation("images", "save");
    let (image, created) = state
        .catalog
        .save_image(&req, state.images.account_hash())
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(ImageResponse {
            success: true,
            image,
            created,
        }),
    ))
}

/// DELETE /api/images/{id} - Delete from the image host, then the catalog.
pub(crate) async fn delete_image(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    metrics::record_operation("images", "delete");
    let image = state
        .catalog
        .get_image(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Image '{id}' not found")))?;

    let users = state.catalog.projects_using_image(&id).await?;
    if !users.is_empty() {
        let names: Vec<String> = users
            .iter()
            .map(|p| format!("'{}' ({})", p.title, p.id))
            .collect();
        return Err(AppError::BadRequest(format!(
            "Image '{id}' is used by project(s) {}",
            names.join(", ")
        )));
    }

    match state.images.delete(&image.cloudflare_id).await {
        Ok(()) => {},
        Err(ImageHostError::NotFound(_)) => {
            // Already gone remotely; dropping the record restores consistency.
            warn!(%id, cloudflare_id = %image.cloudflare_id, "Image missing on host, removing record");
        },
        Err(err) => {
            log_audit_event(AuditEvent::ImageDeleteAborted {
                id: id.clone(),
                reason: err.to_string(),
            });
            return Err(err.into());
        },
    }

    state.catalog.delete_image(&id).await?;
    log_audit_event(AuditEvent::ImageDeleted {
        id: id.clone(),
        cloudflare_id: image.cloudflare_id,
    });

    Ok(Json(DeleteResponse { success: true, id }))
}
