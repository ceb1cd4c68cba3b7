mod database;
pub mod metrics;

// Re-export the factory functions for easy access
pub use database::{
    create_sqlite_pool, create_sqlite_store, init_schema, ExecOutcome, RecordStore,
    SqlValue, SqliteCredentialStore,
};
pub use metrics::{create_noop_metrics, create_prom_metrics};
