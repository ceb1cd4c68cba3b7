// Test helpers are intentionally partially used
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use freight_auth::auth::AuthManager;
use freight_auth::domain::{Clock, CredentialStorePtr, ManualClock, MetricsPtr};
use freight_auth::{
    create_noop_metrics, create_sqlite_pool, create_sqlite_store, DatabaseConfig, RecordStore,
    SecurityConfig, SqlValue,
};
use std::sync::{Arc, Once};
use std::time::Duration;

pub const TEST_SECRET: &str = "integration-test-secret";

static TRACING_INIT: Once = Once::new();

// ============================================================================
// Test Setup
// ============================================================================

pub fn init_tracing() {
    // ---
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_test_writer()
            .init();
    });
}

/// Default policy and lockout, a pinned secret and a cheap hash work factor.
pub fn security_config() -> SecurityConfig {
    // ---
    SecurityConfig {
        secret_key: TEST_SECRET.to_string(),
        argon2_memory_kib: 256,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..SecurityConfig::default()
    }
}

pub fn database_config(database_url: &str) -> DatabaseConfig {
    // ---
    DatabaseConfig {
        database_url: database_url.to_string(),
        max_connections: 1,
        acquire_timeout: Duration::from_secs(5),
    }
}

/// Opens a database and returns both the raw record store and the typed
/// credential store over the same pool.
pub async fn open_database(database_url: &str) -> (RecordStore, CredentialStorePtr) {
    // ---
    init_tracing();
    let pool = create_sqlite_pool(&database_config(database_url))
        .await
        .expect("Should be able to open test database");
    let records = RecordStore::new(pool.clone());
    let store = create_sqlite_store(pool)
        .await
        .expect("Should be able to create schema");
    (records, store)
}

/// Everything a test needs to drive the manager and inspect the results.
pub struct TestHarness {
    pub manager: Arc<AuthManager>,
    pub store: CredentialStorePtr,
    pub records: RecordStore,
    pub clock: Arc<ManualClock>,
}

impl TestHarness {
    // ---
    pub async fn new() -> Self {
        Self::with_config(security_config()).await
    }

    pub async fn with_config(config: SecurityConfig) -> Self {
        // ---
        let (records, store) = open_database("sqlite::memory:").await;
        Self::over_database(records, store, config)
    }

    /// In-memory database with the default test config and the given
    /// metrics backend.
    pub async fn with_metrics(metrics: MetricsPtr) -> Self {
        // ---
        let (records, store) = open_database("sqlite::memory:").await;
        Self::build(records, store, security_config(), metrics)
    }

    pub fn over_database(
        records: RecordStore,
        store: CredentialStorePtr,
        config: SecurityConfig,
    ) -> Self {
        Self::build(records, store, config, create_noop_metrics().unwrap())
    }

    fn build(
        records: RecordStore,
        store: CredentialStorePtr,
        config: SecurityConfig,
        metrics: MetricsPtr,
    ) -> Self {
        // ---
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
        ));
        let manager = AuthManager::new(
            &config,
            store.clone(),
            metrics,
            clock.clone(),
        )
        .expect("Should be able to build auth manager");

        Self {
            manager: Arc::new(manager),
            store,
            records,
            clock,
        }
    }

    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn count_rows(&self, statement: &str, params: &[SqlValue]) -> i64 {
        // ---
        let (count,): (i64,) = self
            .records
            .fetch_optional(statement, params)
            .await
            .expect("count query failed")
            .expect("count returns a row");
        count
    }

    pub async fn user_count(&self, username: &str) -> i64 {
        self.count_rows("SELECT COUNT(*) FROM users WHERE username = ?", &[username.into()])
            .await
    }
}
