//! Storage seam under [`super::SqlService`].
//!
//! The catalog needs parameterized reads, single writes, the schema batch
//! and one multi-statement transaction (project reorder). A hosted
//! Postgres-compatible database plugs in by implementing this trait.

use super::types::{Row, Statement, Value};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SqlBackend: Send + Sync + 'static {
    /// Runs a read and returns every row. Parameters bind to `?` in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement does not prepare or a row cannot
    /// be read.
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Runs a write and returns the affected row count.
    ///
    /// # Errors
    ///
    /// Returns an error on SQL or constraint failure.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Runs an insert and returns the new row id.
    ///
    /// # Errors
    ///
    /// Returns an error on SQL or constraint failure.
    async fn insert(&self, sql: &str, params: &[Value]) -> Result<i64>;

    /// Runs trusted, parameterless SQL such as the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    async fn execute_batch(&self, sql: &str) -> Result<()>;

    /// Runs `statements` in one transaction: either all commit or none do.
    /// Returns each statement's affected row count.
    ///
    /// # Errors
    ///
    /// Returns the first failure after rolling back.
    async fn transaction(&self, statements: Vec<Statement>) -> Result<Vec<usize>>;
}
