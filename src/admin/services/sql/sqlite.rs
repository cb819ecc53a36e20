//! SQLite backend for the SQL service.
//!
//! A single connection guarded by a mutex; every call hops onto the
//! blocking pool so the async runtime never waits on disk I/O.

use super::backend::SqlBackend;
use super::types::{Row, Statement, Value};
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, params_from_iter};
use std::path::Path;
use std::sync::Arc;

/// SQLite-backed storage, file or in-memory.
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Opens (or creates) a database file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or database cannot be created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
            .context("Failed to configure database")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a private in-memory database. Data is lost on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to configure database")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock();
            f(&mut guard)
        })
        .await
        .context("Database task panicked")?
    }
}

fn bind(params: &[Value]) -> Vec<rusqlite::types::Value> {
    params.iter().map(Value::to_rusqlite).collect()
}

#[async_trait]
impl SqlBackend for SqliteBackend {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let sql = sql.to_string();
        let params = bind(params);
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare(&sql)
                .with_context(|| format!("Failed to prepare query: {sql}"))?;
            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(ToString::to_string)
                .collect();
            let column_count = columns.len();

            let mut rows = stmt
                .query(params_from_iter(params.iter()))
                .context("Failed to execute query")?;
            let mut result = Vec::new();
            while let Some(row) = rows.next().context("Failed to fetch row")? {
                let mut values = Vec::with_capacity(column_count);
                for idx in 0..column_count {
                    values.push(Value::from(row.get_ref(idx)?));
                }
                result.push(Row::new(columns.clone(), values));
            }
            Ok(result)
        })
        .await
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let sql = sql.to_string();
        let params = bind(params);
        self.with_conn(move |conn| {
            conn.execute(&sql, params_from_iter(params.iter()))
                .with_context(|| format!("Failed to execute statement: {sql}"))
        })
        .await
    }

    async fn insert(&self, sql: &str, params: &[Value]) -> Result<i64> {
        let sql = sql.to_string();
        let params = bind(params);
        self.with_conn(move |conn| {
            conn.execute(&sql, params_from_iter(params.iter()))
                .with_context(|| format!("Failed to execute insert: {sql}"))?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        let sql = sql.to_string();
        self.with_conn(move |conn| {
            conn.execute_batch(&sql)
                .context("Failed to execute batch")
        })
        .await
    }

    async fn transaction(&self, statements: Vec<Statement>) -> Result<Vec<usize>> {
        self.with_conn(move |conn| {
            let tx = conn.transaction().context("Failed to begin transaction")?;
            let mut affected = Vec::with_capacity(statements.len());
            for statement in &statements {
                let params = bind(&statement.params);
                let n = tx
                    .execute(&statement.sql, params_from_iter(params.iter()))
                    .with_context(|| format!("Failed to execute statement: {}", statement.sql))?;
                affected.push(n);
            }
            // Dropping `tx` on the error paths above rolls back.
            tx.commit().context("Failed to commit transaction")?;
            Ok(affected)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_query() {
        let db = SqliteBackend::in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();
        let id = db
            .insert("INSERT INTO t (name) VALUES (?)", &["cedar".into()])
            .await
            .unwrap();
        assert_eq!(id, 1);

        let rows = db.query("SELECT * FROM t", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("name").unwrap(), "cedar");
    }

    #[tokio::test]
    async fn test_transaction_rolls_back() {
        let db = SqliteBackend::in_memory().unwrap();
        db.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, rank INTEGER NOT NULL)")
            .await
            .unwrap();
        db.insert("INSERT INTO t (rank) VALUES (?)", &[Value::Integer(5)])
            .await
            .unwrap();

        let result = db
            .transaction(vec![
                Statement::new("UPDATE t SET rank = 0 WHERE id = 1", vec![]),
                Statement::new("UPDATE t SET rank = NULL WHERE id = 1", vec![]),
            ])
            .await;
        assert!(result.is_err());

        let rows = db.query("SELECT rank FROM t", &[]).await.unwrap();
        assert_eq!(rows[0].integer("rank").unwrap(), 5);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("folio.db");
        {
            let db = SqliteBackend::open(&path).unwrap();
            db.execute_batch("CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('kept');")
                .await
                .unwrap();
        }
        let db = SqliteBackend::open(&path).unwrap();
        let rows = db.query("SELECT v FROM t", &[]).await.unwrap();
        assert_eq!(rows[0].text("v").unwrap(), "kept");
    }
}
