//! HTTP API handlers organized by resource.

pub mod images;
pub mod projects;
pub mod system;
pub mod upload;

// Re-export all handlers for use in routing
pub(crate) use images::{delete_image, get_image, list_images, save_image};
pub(crate) use projects::{
    create_project, delete_project, get_project, list_projects, reorder_projects, update_project,
};
pub(crate) use system::{client_config, health, metrics_text, not_found};
pub(crate) use upload::upload;
