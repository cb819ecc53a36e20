//! Persisted record types shared by the admin service, the admin client
//! and the site export.
//!
//! - [`ImageRecord`] - an image hosted on the image CDN plus local metadata
//! - [`Project`] - a portfolio entry referencing images by key
//! - [`FocalPoint`] - normalized crop center of an image

mod focal;
mod image;
mod project;

pub use focal::FocalPoint;
pub use image::{ImageRecord, NewImage};
pub use project::{Category, Project, ProjectDraft};
