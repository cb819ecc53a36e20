//! Value and row types shared by all SQL backends.

use anyhow::{Result, anyhow};
use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

/// SQL value types bound as parameters and returned from queries.
///
/// Mirrors the column affinities used by the catalog schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<ValueRef<'_>> for Value {
    fn from(value_ref: ValueRef<'_>) -> Self {
        match value_ref {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(i) => Self::Integer(i),
            ValueRef::Real(r) => Self::Real(r),
            ValueRef::Text(t) => Self::Text(String::from_utf8_lossy(t).to_string()),
            // The catalog never stores blobs; surface them as text so a
            // hand-edited database still loads.
            ValueRef::Blob(b) => Self::Text(String::from_utf8_lossy(b).to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

impl Value {
    /// Converts to a rusqlite value for parameter binding.
    pub fn to_rusqlite(&self) -> rusqlite::types::Value {
        match self {
            Self::Null => rusqlite::types::Value::Null,
            Self::Integer(i) => rusqlite::types::Value::Integer(*i),
            Self::Real(r) => rusqlite::types::Value::Real(*r),
            Self::Text(s) => rusqlite::types::Value::Text(s.clone()),
        }
    }
}

/// One parameterized write inside a [`super::SqlService::transaction`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// A single row returned from a query: column names and values in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<String>,
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given columns and values.
    ///
    /// # Panics
    ///
    /// Panics if `columns.len()` != `values.len()`.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Column count ({}) must match value count ({})",
            columns.len(),
            values.len()
        );
        Self { columns, values }
    }

    /// Gets a value by column name, returning None if not found.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Reads a text column; NULL reads as an empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not text.
    pub fn text(&self, column: &str) -> Result<String> {
        match self.get(column) {
            Some(Value::Text(s)) => Ok(s.clone()),
            Some(Value::Null) => Ok(String::new()),
            Some(other) => Err(anyhow!("column '{column}' is not text: {other:?}")),
            None => Err(anyhow!("column '{column}' missing from row")),
        }
    }

    /// Reads a nullable text column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not text.
    pub fn opt_text(&self, column: &str) -> Result<Option<String>> {
        match self.get(column) {
            Some(Value::Null) => Ok(None),
            _ => self.text(column).map(Some),
        }
    }

    /// Reads an integer column; NULL reads as zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not an integer.
    pub fn integer(&self, column: &str) -> Result<i64> {
        match self.get(column) {
            Some(Value::Integer(i)) => Ok(*i),
            Some(Value::Null) => Ok(0),
            Some(other) => Err(anyhow!("column '{column}' is not an integer: {other:?}")),
            None => Err(anyhow!("column '{column}' missing from row")),
        }
    }

    /// Reads a nullable real column, accepting integers.
    ///
    /// # Errors
    ///
    /// Returns an error if the column is missing or not numeric.
    #[allow(clippy::cast_precision_loss)]
    pub fn real(&self, column: &str) -> Result<Option<f64>> {
        match self.get(column) {
            Some(Value::Real(r)) => Ok(Some(*r)),
            Some(Value::Integer(i)) => Ok(Some(*i as f64)),
            Some(Value::Null) => Ok(None),
            Some(other) => Err(anyhow!("column '{column}' is not numeric: {other:?}")),
            None => Err(anyhow!("column '{column}' missing from row")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            vec!["name".into(), "rank".into(), "focal_x".into(), "thumb".into()],
            vec![
                Value::Text("Cedar".into()),
                Value::Integer(2),
                Value::Integer(1),
                Value::Null,
            ],
        )
    }

    #[test]
    fn test_typed_getters() {
        let row = row();
        assert_eq!(row.text("name").unwrap(), "Cedar");
        assert_eq!(row.integer("rank").unwrap(), 2);
        assert_eq!(row.real("focal_x").unwrap(), Some(1.0));
        assert_eq!(row.opt_text("thumb").unwrap(), None);
    }

    #[test]
    fn test_wrong_type_is_error() {
        let row = row();
        assert!(row.integer("name").is_err());
        assert!(row.text("missing").is_err());
    }

    #[test]
    #[should_panic(expected = "Column count")]
    fn test_row_length_mismatch_panics() {
        let _ = Row::new(vec!["a".into()], vec![]);
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }
}
