//! folio - portfolio admin service and gallery engine.
//!
//! The crate has two halves that share the record types in [`model`]:
//!
//! - [`admin`] - REST CRUD for images and projects, backed by SQLite and an
//!   image CDN, plus a typed client for it
//! - [`gallery`] - scroll/snap, transition and preload state machines for
//!   the public gallery
//!
//! The `folio` binary wires these together (`serve`, `seed`, `export`,
//! `config check`).

pub mod admin;
pub mod commands;
pub mod config;
pub mod constants;
pub mod gallery;
pub mod geometry;
pub mod model;
pub mod utils;
