//! SQL service with pluggable backends.
//!
//! The catalog talks to its relational store exclusively through
//! [`SqlService`]. SQLite (file or in-memory) ships in-tree; a hosted
//! Postgres-compatible database is reached by implementing [`SqlBackend`].
//!
//! # Example
//!
//! ```ignore
//! use folio::admin::services::sql::{SqlService, Value};
//!
//! let service = SqlService::file("~/.folio/folio.db")?;
//! let rows = service
//!     .query("SELECT * FROM projects WHERE category = ?", &[Value::from("architecture")])
//!     .await?;
//! ```

mod backend;
mod service;
mod sqlite;
mod types;

pub use backend::SqlBackend;
pub use service::SqlService;
pub use sqlite::SqliteBackend;
pub use types::{Row, Statement, Value};
