//! Catalog of image and project records.
//!
//! Owns the relational schema and maps rows to [`crate::model`] types.
//! Referential checks (project → image keys) happen here; ordering of
//! side effects against the image host is the HTTP layer's job.

mod images;
mod projects;

use anyhow::Context;

use super::services::sql::SqlService;

/// Schema applied idempotently on open.
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS images (
    id            TEXT PRIMARY KEY,
    cloudflare_id TEXT NOT NULL,
    account_hash  TEXT NOT NULL,
    focal_x       REAL NOT NULL DEFAULT 0.5,
    focal_y       REAL NOT NULL DEFAULT 0.5,
    alt           TEXT NOT NULL DEFAULT '',
    filename      TEXT NOT NULL DEFAULT '',
    width         INTEGER NOT NULL DEFAULT 0,
    height        INTEGER NOT NULL DEFAULT 0,
    uploaded_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    title             TEXT NOT NULL,
    category          TEXT NOT NULL,
    thumbnail         TEXT,
    short_description TEXT NOT NULL DEFAULT '',
    long_description  TEXT NOT NULL DEFAULT '',
    year              TEXT NOT NULL DEFAULT '',
    location          TEXT NOT NULL DEFAULT '',
    project_type      TEXT NOT NULL DEFAULT '',
    images            TEXT NOT NULL DEFAULT '[]',
    rank              INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_projects_category_rank ON projects (category, rank);
";

/// Errors surfaced by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Input failed validation (missing or duplicate key, dangling reference).
    #[error("{0}")]
    Validation(String),

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The database failed.
    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Image and project records on top of a [`SqlService`].
#[derive(Clone)]
pub struct Catalog {
    sql: SqlService,
}

impl Catalog {
    /// Wraps a SQL service and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub async fn open(sql: SqlService) -> anyhow::Result<Self> {
        sql.execute_batch(SCHEMA)
            .await
            .context("Failed to apply catalog schema")?;
        Ok(Self { sql })
    }

    /// Opens a catalog over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub async fn memory() -> anyhow::Result<Self> {
        Self::open(SqlService::memory()?).await
    }
}
