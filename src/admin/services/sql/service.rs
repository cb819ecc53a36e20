//! [`SqlService`]: the handle the catalog holds.

use super::backend::SqlBackend;
use super::sqlite::SqliteBackend;
use super::types::{Row, Statement, Value};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Cloneable handle over a shared [`SqlBackend`].
#[derive(Clone)]
pub struct SqlService {
    backend: Arc<dyn SqlBackend>,
}

impl SqlService {
    /// Opens (or creates) the SQLite database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory cannot be created.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::custom(SqliteBackend::open(path)?))
    }

    /// A throwaway in-memory database for tests and `--ephemeral` runs.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn memory() -> Result<Self> {
        Ok(Self::custom(SqliteBackend::in_memory()?))
    }

    pub fn custom<B: SqlBackend>(backend: B) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        self.backend.query(sql, params).await
    }

    /// Like [`Self::query`] but keeps only the first row.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>> {
        let rows = self.backend.query(sql, params).await?;
        Ok(rows.into_iter().next())
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        self.backend.execute(sql, params).await
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        self.backend.insert(sql, params).await
    }

    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.backend.execute_batch(sql).await
    }

    /// All-or-nothing write of several statements.
    ///
    /// # Errors
    ///
    /// Returns the first failing statement's error; nothing is committed.
    pub async fn transaction(&self, statements: Vec<Statement>) -> Result<Vec<usize>> {
        self.backend.transaction(statements).await
    }
}
