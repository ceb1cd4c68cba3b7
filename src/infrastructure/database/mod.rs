mod record_store;
mod schema;
mod sqlite_repository;


use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::domain::CredentialStorePtr;

pub use record_store::{ExecOutcome, RecordStore, SqlValue};
pub use schema::init_schema;
pub use sqlite_repository::SqliteCredentialStore;

/// Opens the process-wide SQLite pool.
///
/// The database file is created if missing. Idle connections are never
/// reaped, which also keeps a `sqlite::memory:` database alive for as long
/// as the pool lives.
///
/// # Errors
/// Returns an error if the URL is malformed or the database cannot be opened.
pub async fn create_sqlite_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    // ---
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    tracing::info!("Opened record store at {}", config.database_url);

    Ok(pool)
}

/// Creates the SQLite-backed credential store, creating its tables first.
///
/// # Errors
/// Returns an error if the schema cannot be created.
pub async fn create_sqlite_store(pool: SqlitePool) -> Result<CredentialStorePtr> {
    // ---
    let records = RecordStore::new(pool);
    init_schema(&records)
        .await
        .context("Failed to create auth schema")?;

    Ok(Arc::new(SqliteCredentialStore::new(records)))
}
