//! Project handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use super::super::audit::{AuditEvent, log_audit_event};
use super::super::types::{
    DeleteResponse, ProjectListQuery, ProjectListResponse, ProjectResponse, ReorderRequest,
};
use super::super::{ApiJson, AppError, SharedState, metrics};
use crate::model::ProjectDraft;

/// GET /api/projects - List projects, optionally `?category=`.
pub(crate) async fn list_projects(
    State(state): State<SharedState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<ProjectListResponse>, AppError> {
    metrics::record_operation("projects", "list");
    let projects = state.catalog.list_projects(query.category).await?;
    Ok(Json(ProjectListResponse {
        success: true,
        projects,
    }))
}

/// GET /api/projects/{id} - Get one project.
pub(crate) async fn get_project(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<ProjectResponse>, AppError> {
    metrics::record_operation("projects", "get");
    let project = state
        .catalog
        .get_project(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;
    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}

/// POST /api/projects - Create a project at the end of its category.
pub(crate) async fn create_project(
    State(state): State<SharedState>,
    ApiJson(draft): ApiJson<ProjectDraft>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    metrics::record_operation("projects", "create");
    let project = state.catalog.create_project(&draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            success: true,
            project,
        }),
    ))
}

/// PUT /api/projects/{id} - Replace a project's editable fields.
pub(crate) async fn update_project(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    ApiJson(draft): ApiJson<ProjectDraft>,
) -> Result<Json<ProjectResponse>, AppError> {
    metrics::record_operation("projects", "update");
    let project = state.catalog.update_project(id, &draft).await?;
    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}

/// DELETE /api/projects/{id} - Delete a project.
pub(crate) async fn delete_project(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, AppError> {
    metrics::record_operation("projects", "delete");
    state.catalog.delete_project(id).await?;
    log_audit_event(AuditEvent::ProjectDeleted { id });
    Ok(Json(DeleteResponse {
        success: true,
        id: id.to_string(),
    }))
}

/// PUT /api/projects/reorder - Rewrite ranks of one category.
pub(crate) async fn reorder_projects(
    State(state): State<SharedState>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> Result<Json<ProjectListResponse>, AppError> {
    metrics::record_operation("projects", "reorder");
    let projects = state
        .catalog
        .reorder_projects(req.category, &req.order)
        .await?;
    log_audit_event(AuditEvent::ProjectsReordered {
        category: req.category,
        count: req.order.len(),
    });
    Ok(Json(ProjectListResponse {
        success: true,
        projects,
    }))
}
