//! Audit logging for admin events.
//!
//! Authentication outcomes and destructive catalog operations are logged on
//! the `audit` target so they can be routed separately from request logs.

use std::net::SocketAddr;
use tracing::{info, warn};

use crate::model::Category;

/// Events worth keeping an audit trail for.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Failed basic-auth attempt.
    AuthFailure {
        remote_addr: Option<SocketAddr>,
        reason: String,
    },
    /// Image removed from the host and from the catalog.
    ImageDeleted { id: String, cloudflare_id: String },
    /// Remote deletion failed, so the catalog record was kept.
    ImageDeleteAborted { id: String, reason: String },
    /// Project deleted.
    ProjectDeleted { id: i64 },
    /// Category ranks rewritten.
    ProjectsReordered { category: Category, count: usize },
}

/// Log an audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::AuthFailure {
            remote_addr,
            reason,
        } => {
            warn!(
                target: "audit",
                event_type = "auth_failure",
                remote_addr = ?remote_addr,
                %reason,
                "Authentication failed"
            );
        },
        AuditEvent::ImageDeleted { id, cloudflare_id } => {
            info!(
                target: "audit",
                event_type = "image_deleted",
                %id,
                %cloudflare_id,
                "Image deleted"
            );
        },
        AuditEvent::ImageDeleteAborted { id, reason } => {
            warn!(
                target: "audit",
                event_type = "image_delete_aborted",
                %id,
                %reason,
                "Image host refused deletion; catalog record kept"
            );
        },
        AuditEvent::ProjectDeleted { id } => {
            info!(
                target: "audit",
                event_type = "project_deleted",
                id,
                "Project deleted"
            );
        },
        AuditEvent::ProjectsReordered { category, count } => {
            info!(
                target: "audit",
                event_type = "projects_reordered",
                %category,
                count,
                "Projects reordered"
            );
        },
    }
}
