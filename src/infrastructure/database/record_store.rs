//! Generic record store over a SQLite pool.
//!
//! This is the only place statements are bound and executed. Callers hand
//! over SQL text plus positional [`SqlValue`] parameters, or a table name
//! plus a field map for inserts; rows come back through `sqlx::FromRow`
//! so the untyped-to-typed step stays in the repository that owns the row
//! struct.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{Arguments, FromRow};

use crate::domain::StorageError;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// A positional statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    // ---
    Null,
    Integer(i64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// Result of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    // ---
    pub rows_affected: u64,
    pub last_insert_id: i64,
}

#[derive(Clone)]
pub struct RecordStore {
    // ---
    pool: SqlitePool,
}

impl RecordStore {
    // ---
    pub fn new(pool: SqlitePool) -> Self {
        // ---
        Self { pool }
    }

    /// Run a statement (DDL, UPDATE, INSERT) and report what it touched.
    pub async fn execute(&self, statement: &str, params: &[SqlValue]) -> Result<ExecOutcome, StorageError> {
        // ---
        tracing::debug!("execute: {}", first_line(statement));

        let result = sqlx::query_with(statement, arguments(params)?)
            .execute(&self.pool)
            .await?;

        Ok(ExecOutcome {
            rows_affected: result.rows_affected(),
            last_insert_id: result.last_insert_rowid(),
        })
    }

    /// Fetch at most one row.
    pub async fn fetch_optional<T>(&self, statement: &str, params: &[SqlValue]) -> Result<Option<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        // ---
        tracing::debug!("fetch_optional: {}", first_line(statement));

        let row = sqlx::query_as_with::<_, T, _>(statement, arguments(params)?)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    /// Fetch every matching row.
    pub async fn fetch_all<T>(&self, statement: &str, params: &[SqlValue]) -> Result<Vec<T>, StorageError>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        // ---
        tracing::debug!("fetch_all: {}", first_line(statement));

        let rows = sqlx::query_as_with::<_, T, _>(statement, arguments(params)?)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Insert one row built from a field map and return its rowid.
    ///
    /// Table and column names are interpolated into the statement, so they
    /// must be plain identifiers; values are always bound.
    pub async fn insert(&self, table: &str, fields: &[(&str, SqlValue)]) -> Result<i64, StorageError> {
        // ---
        ensure_identifier(table)?;

        if fields.is_empty() {
            return Err(StorageError::InvalidStatement(format!(
                "insert into {table} without fields"
            )));
        }

        let mut columns = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (column, value) in fields {
            ensure_identifier(column)?;
            columns.push(*column);
            values.push(value.clone());
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let statement = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );

        let outcome = self.execute(&statement, &values).await?;

        Ok(outcome.last_insert_id)
    }
}

fn ensure_identifier(name: &str) -> Result<(), StorageError> {
    // ---
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(StorageError::InvalidIdentifier(name.to_string()))
    }
}

fn first_line(statement: &str) -> &str {
    // ---
    statement.trim().lines().next().unwrap_or_default()
}

/// Positional arguments for one statement.
fn arguments(params: &[SqlValue]) -> Result<SqliteArguments<'_>, StorageError> {
    // ---
    let mut args = SqliteArguments::default();
    for param in params {
        let added = match param {
            SqlValue::Null => args.add(None::<String>),
            SqlValue::Integer(v) => args.add(*v),
            SqlValue::Text(v) => args.add(v.as_str()),
            SqlValue::Bool(v) => args.add(*v),
            SqlValue::Timestamp(v) => args.add(*v),
        };
        added.map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}
