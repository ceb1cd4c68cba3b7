// src/lib.rs
use anyhow::{Context, Result};
use std::sync::Arc;

// Public exports (visible outside this module)
pub mod auth;
pub mod domain;

// Internal-only exports (sibling access within this module)
mod config;
mod infrastructure;

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_noop_metrics, // ---
    create_prom_metrics,
    create_sqlite_pool,
    create_sqlite_store,
    init_schema,
    ExecOutcome,
    RecordStore,
    SqlValue,
    SqliteCredentialStore,
};

use auth::{AuthFacade, AuthManager};
use domain::{AuthError, MetricsPtr, SystemClock};

/// Build the auth manager with every dependency determined by environment variables.
///
/// Opens (creating if needed) the SQLite store, creates the schema and seeds
/// the default admin account. A bootstrap password rejected by a stricter
/// configured policy is logged and startup continues without the account.
///
/// # Errors
/// Returns an error for invalid configuration or an unusable database.
pub async fn create_auth_manager() -> Result<Arc<AuthManager>> {
    // ---
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    let metrics: MetricsPtr = match config.metrics.backend {
        MetricsBackend::Prometheus => create_prom_metrics()?,
        MetricsBackend::Noop => create_noop_metrics()?,
    };

    // Create infrastructure dependencies
    let pool = create_sqlite_pool(&config.database).await?;
    let store = create_sqlite_store(pool).await?;

    let manager = AuthManager::new(&config.security, store, metrics, Arc::new(SystemClock))
        .context("Failed to build auth manager")?;

    match manager.ensure_admin_exists().await {
        Ok(true) => tracing::info!("Seeded default admin account"),
        Ok(false) => {}
        Err(AuthError::Policy(e)) => {
            tracing::error!("Default admin account not created: {}", e);
        }
        Err(e) => return Err(e).context("Failed to seed admin account"),
    }

    tracing::info!("Auth core v{} ready", env!("CARGO_PKG_VERSION"));
    Ok(Arc::new(manager))
}

/// [`create_auth_manager`] wrapped in the tuple-returning UI facade.
pub async fn create_auth_facade() -> Result<AuthFacade> {
    Ok(AuthFacade::new(create_auth_manager().await?))
}
