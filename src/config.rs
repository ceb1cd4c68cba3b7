// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the auth core.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional environment variable as a non-empty string.
macro_rules! optional_env {
    // ---
    ($key:literal) => {
        std::env::var($key).ok().filter(|v| !v.trim().is_empty())
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails with a message
/// naming the offending variable.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: database::DatabaseConfig,
    pub security: security::SecurityConfig,
    pub metrics: telemetry::MetricsConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any configuration value is invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            database: database::DatabaseConfig::from_env()?,
            security: security::SecurityConfig::from_env()?,
            metrics: telemetry::MetricsConfig::from_env()?,
        })
    }
}

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Default location of the application's database file.
    pub const DEFAULT_DATABASE_URL: &str = "sqlite://fuvarok.db";

    /// Record store configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// SQLite connection string. `sqlite::memory:` is accepted for tests.
        pub database_url: String,

        /// Maximum pooled connections. Defaults to 1: one process, one writer.
        pub max_connections: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the connection limit is zero.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = optional_env!("DATABASE_URL")
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
            let max_connections = optional_env_parse!("AUTH_DB_MAX_CONNECTIONS", u32, 1);
            let acquire_timeout_secs = optional_env_parse!("AUTH_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);

            if max_connections == 0 {
                anyhow::bail!("Invalid configuration: AUTH_DB_MAX_CONNECTIONS must be at least 1");
            }

            Ok(Self {
                database_url,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            })
        }
    }
}
pub use database::{DatabaseConfig, DEFAULT_DATABASE_URL};

// ============================================================
// Security configuration
// ============================================================

mod security {
    // ---
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use jsonwebtoken::Algorithm;
    use rand::rngs::OsRng;
    use rand::RngCore;
    use std::fmt;
    use std::str::FromStr;

    /// Upper bound for `AUTH_LOCKOUT_MINUTES` (one year).
    pub const MAX_LOCKOUT_MINUTES: u32 = 525_600;

    /// Upper bound for `AUTH_TOKEN_EXPIRY_DAYS` (ten years).
    pub const MAX_TOKEN_EXPIRY_DAYS: u32 = 3_650;

    /// Security policy snapshot.
    ///
    /// Constructed once per Auth Manager lifetime and read-only afterwards.
    /// It is passed explicitly to every component that needs it, so tests
    /// can pin the signing secret and shrink the hash work factor.
    #[derive(Clone)]
    pub struct SecurityConfig {
        /// Minimum password length in characters. Defaults to 8.
        pub min_password_length: usize,

        /// Require a character from the special set. Defaults to false.
        pub require_special_char: bool,

        /// Require a digit. Defaults to false.
        pub require_number: bool,

        /// Require an uppercase letter. Defaults to false.
        pub require_uppercase: bool,

        /// Failed attempts that engage the lock. Defaults to 3.
        pub max_login_attempts: u32,

        /// How long a lock lasts once engaged. Defaults to 15 minutes.
        pub lockout_duration: chrono::Duration,

        /// Lifetime of an issued token. Defaults to 1 day.
        pub token_expiry: chrono::Duration,

        /// HMAC algorithm used to sign tokens. Defaults to HS256.
        pub token_algorithm: Algorithm,

        /// Token signing secret. Regenerated on every process start unless
        /// pinned through `AUTH_TOKEN_SECRET`; a fresh secret invalidates
        /// every token issued by a previous run.
        pub secret_key: String,

        /// Argon2id memory cost in KiB.
        pub argon2_memory_kib: u32,

        /// Argon2id iterations.
        pub argon2_time_cost: u32,

        /// Argon2id lanes.
        pub argon2_parallelism: u32,
    }

    impl Default for SecurityConfig {
        fn default() -> Self {
            // ---
            Self {
                min_password_length: 8,
                require_special_char: false,
                require_number: false,
                require_uppercase: false,
                max_login_attempts: 3,
                lockout_duration: chrono::Duration::minutes(15),
                token_expiry: chrono::Duration::days(1),
                token_algorithm: Algorithm::HS256,
                secret_key: generate_secret(),
                argon2_memory_kib: argon2::Params::DEFAULT_M_COST,
                argon2_time_cost: argon2::Params::DEFAULT_T_COST,
                argon2_parallelism: argon2::Params::DEFAULT_P_COST,
            }
        }
    }

    // The secret must never reach a log line.
    impl fmt::Debug for SecurityConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("SecurityConfig")
                .field("min_password_length", &self.min_password_length)
                .field("require_special_char", &self.require_special_char)
                .field("require_number", &self.require_number)
                .field("require_uppercase", &self.require_uppercase)
                .field("max_login_attempts", &self.max_login_attempts)
                .field("lockout_duration", &self.lockout_duration)
                .field("token_expiry", &self.token_expiry)
                .field("token_algorithm", &self.token_algorithm)
                .field("secret_key", &"<redacted>")
                .field("argon2_memory_kib", &self.argon2_memory_kib)
                .field("argon2_time_cost", &self.argon2_time_cost)
                .field("argon2_parallelism", &self.argon2_parallelism)
                .finish()
        }
    }

    impl SecurityConfig {
        /// Builds a [`SecurityConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error for a non-HMAC signing algorithm, a zero
        /// attempt threshold, a lockout or token lifetime outside its
        /// bounds, or Argon2 parameters the hasher would reject.
        pub fn from_env() -> Result<Self> {
            // ---
            let defaults = Self::default();

            let algorithm_name = optional_env!("AUTH_TOKEN_ALGORITHM").unwrap_or_else(|| "HS256".to_string());
            let token_algorithm = Algorithm::from_str(&algorithm_name)
                .ok()
                .filter(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Invalid configuration: AUTH_TOKEN_ALGORITHM must be HS256, HS384 or HS512 (got {algorithm_name})"
                    )
                })?;

            let max_login_attempts = optional_env_parse!("AUTH_MAX_LOGIN_ATTEMPTS", u32, defaults.max_login_attempts);
            if max_login_attempts == 0 {
                anyhow::bail!("Invalid configuration: AUTH_MAX_LOGIN_ATTEMPTS must be at least 1");
            }

            let lockout_minutes = optional_env_parse!("AUTH_LOCKOUT_MINUTES", u32, 15);
            if !(1..=MAX_LOCKOUT_MINUTES).contains(&lockout_minutes) {
                anyhow::bail!(
                    "Invalid configuration: AUTH_LOCKOUT_MINUTES must be between 1 and {MAX_LOCKOUT_MINUTES} (got {lockout_minutes})"
                );
            }

            let token_expiry_days = optional_env_parse!("AUTH_TOKEN_EXPIRY_DAYS", u32, 1);
            if !(1..=MAX_TOKEN_EXPIRY_DAYS).contains(&token_expiry_days) {
                anyhow::bail!(
                    "Invalid configuration: AUTH_TOKEN_EXPIRY_DAYS must be between 1 and {MAX_TOKEN_EXPIRY_DAYS} (got {token_expiry_days})"
                );
            }

            let secret_key = match optional_env!("AUTH_TOKEN_SECRET") {
                Some(secret) => secret,
                None => {
                    tracing::warn!(
                        "AUTH_TOKEN_SECRET not set; generated a per-process secret, tokens will not survive a restart"
                    );
                    defaults.secret_key.clone()
                }
            };

            let config = Self {
                min_password_length: optional_env_parse!(
                    "AUTH_MIN_PASSWORD_LENGTH",
                    usize,
                    defaults.min_password_length
                ),
                require_special_char: optional_env_parse!("AUTH_REQUIRE_SPECIAL_CHAR", bool, false),
                require_number: optional_env_parse!("AUTH_REQUIRE_NUMBER", bool, false),
                require_uppercase: optional_env_parse!("AUTH_REQUIRE_UPPERCASE", bool, false),
                max_login_attempts,
                lockout_duration: chrono::Duration::minutes(i64::from(lockout_minutes)),
                token_expiry: chrono::Duration::days(i64::from(token_expiry_days)),
                token_algorithm,
                secret_key,
                argon2_memory_kib: optional_env_parse!("AUTH_ARGON2_MEMORY_KIB", u32, defaults.argon2_memory_kib),
                argon2_time_cost: optional_env_parse!("AUTH_ARGON2_TIME_COST", u32, defaults.argon2_time_cost),
                argon2_parallelism: optional_env_parse!(
                    "AUTH_ARGON2_PARALLELISM",
                    u32,
                    defaults.argon2_parallelism
                ),
            };

            config.argon2_params()?;

            Ok(config)
        }

        /// Argon2 parameters for this work factor.
        ///
        /// # Errors
        /// Returns an error if the combination is outside Argon2's limits.
        pub fn argon2_params(&self) -> Result<argon2::Params> {
            // ---
            argon2::Params::new(
                self.argon2_memory_kib,
                self.argon2_time_cost,
                self.argon2_parallelism,
                None,
            )
            .map_err(|e| anyhow::anyhow!("Invalid configuration: AUTH_ARGON2_* rejected: {e}"))
        }
    }

    /// 32 random bytes, URL-safe base64 without padding.
    pub fn generate_secret() -> String {
        // ---
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
pub use security::{generate_secret, SecurityConfig, MAX_LOCKOUT_MINUTES, MAX_TOKEN_EXPIRY_DAYS};

// ============================================================
// Metrics configuration
// ============================================================

mod telemetry {
    // ---
    use super::*;

    /// Which `Metrics` implementation the startup facade wires in.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum MetricsBackend {
        #[default]
        Noop,
        Prometheus,
    }

    #[derive(Debug, Clone, Default)]
    pub struct MetricsConfig {
        /// `AUTH_METRICS_TYPE`: `noop` (default) or `prom`.
        pub backend: MetricsBackend,
    }

    impl MetricsConfig {
        // ---
        pub fn from_env() -> Result<Self> {
            // ---
            let backend = match optional_env!("AUTH_METRICS_TYPE").as_deref() {
                None | Some("noop") => MetricsBackend::Noop,
                Some("prom") => MetricsBackend::Prometheus,
                Some(other) => anyhow::bail!(
                    "Invalid configuration: AUTH_METRICS_TYPE must be noop or prom, got {other}"
                ),
            };

            Ok(Self { backend })
        }
    }
}

pub use telemetry::{MetricsBackend, MetricsConfig};

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use anyhow::Result;
    use jsonwebtoken::Algorithm;
    use serial_test::serial;

    const SECURITY_VARS: &[&str] = &[
        "AUTH_MIN_PASSWORD_LENGTH",
        "AUTH_REQUIRE_SPECIAL_CHAR",
        "AUTH_REQUIRE_NUMBER",
        "AUTH_REQUIRE_UPPERCASE",
        "AUTH_MAX_LOGIN_ATTEMPTS",
        "AUTH_LOCKOUT_MINUTES",
        "AUTH_TOKEN_EXPIRY_DAYS",
        "AUTH_TOKEN_ALGORITHM",
        "AUTH_TOKEN_SECRET",
        "AUTH_ARGON2_MEMORY_KIB",
        "AUTH_ARGON2_TIME_COST",
        "AUTH_ARGON2_PARALLELISM",
    ];

    fn clear_security_env() {
        // ---
        for key in SECURITY_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn database_defaults_applied() -> Result<()> {
        // ---
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("AUTH_DB_MAX_CONNECTIONS");
        std::env::remove_var("AUTH_DB_ACQUIRE_TIMEOUT_SEC");

        let cfg = DatabaseConfig::from_env()?;
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.max_connections, 1);
        assert_eq!(cfg.acquire_timeout.as_secs(), 30);

        Ok(())
    }

    #[test]
    #[serial]
    fn database_overrides_defaults() -> Result<()> {
        // ---
        std::env::set_var("DATABASE_URL", "sqlite::memory:");
        std::env::set_var("AUTH_DB_MAX_CONNECTIONS", "2");
        std::env::set_var("AUTH_DB_ACQUIRE_TIMEOUT_SEC", "5");

        let cfg = DatabaseConfig::from_env()?;
        assert_eq!(cfg.database_url, "sqlite::memory:");
        assert_eq!(cfg.max_connections, 2);
        assert_eq!(cfg.acquire_timeout.as_secs(), 5);

        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("AUTH_DB_MAX_CONNECTIONS");
        std::env::remove_var("AUTH_DB_ACQUIRE_TIMEOUT_SEC");

        Ok(())
    }

    #[test]
    #[serial]
    fn zero_connections_rejected() {
        // ---
        std::env::set_var("AUTH_DB_MAX_CONNECTIONS", "0");
        assert_invalid_config!(DatabaseConfig::from_env(), "AUTH_DB_MAX_CONNECTIONS");
        std::env::remove_var("AUTH_DB_MAX_CONNECTIONS");
    }

    #[test]
    #[serial]
    fn security_defaults_applied() -> Result<()> {
        // ---
        clear_security_env();

        let cfg = SecurityConfig::from_env()?;
        assert_eq!(cfg.min_password_length, 8);
        assert!(!cfg.require_special_char);
        assert!(!cfg.require_number);
        assert!(!cfg.require_uppercase);
        assert_eq!(cfg.max_login_attempts, 3);
        assert_eq!(cfg.lockout_duration, chrono::Duration::minutes(15));
        assert_eq!(cfg.token_expiry, chrono::Duration::days(1));
        assert_eq!(cfg.token_algorithm, Algorithm::HS256);
        assert!(!cfg.secret_key.is_empty());

        Ok(())
    }

    #[test]
    #[serial]
    fn security_overrides_defaults() -> Result<()> {
        // ---
        clear_security_env();
        std::env::set_var("AUTH_MIN_PASSWORD_LENGTH", "12");
        std::env::set_var("AUTH_REQUIRE_SPECIAL_CHAR", "true");
        std::env::set_var("AUTH_REQUIRE_NUMBER", "true");
        std::env::set_var("AUTH_REQUIRE_UPPERCASE", "true");
        std::env::set_var("AUTH_MAX_LOGIN_ATTEMPTS", "5");
        std::env::set_var("AUTH_LOCKOUT_MINUTES", "30");
        std::env::set_var("AUTH_TOKEN_EXPIRY_DAYS", "7");
        std::env::set_var("AUTH_TOKEN_ALGORITHM", "HS512");
        std::env::set_var("AUTH_TOKEN_SECRET", "pinned-secret");

        let cfg = SecurityConfig::from_env()?;
        assert_eq!(cfg.min_password_length, 12);
        assert!(cfg.require_special_char);
        assert!(cfg.require_number);
        assert!(cfg.require_uppercase);
        assert_eq!(cfg.max_login_attempts, 5);
        assert_eq!(cfg.lockout_duration, chrono::Duration::minutes(30));
        assert_eq!(cfg.token_expiry, chrono::Duration::days(7));
        assert_eq!(cfg.token_algorithm, Algorithm::HS512);
        assert_eq!(cfg.secret_key, "pinned-secret");

        clear_security_env();
        Ok(())
    }

    #[test]
    #[serial]
    fn unpinned_secret_differs_per_load() -> Result<()> {
        // ---
        clear_security_env();

        let first = SecurityConfig::from_env()?;
        let second = SecurityConfig::from_env()?;
        assert_ne!(first.secret_key, second.secret_key);

        Ok(())
    }

    #[test]
    #[serial]
    fn asymmetric_algorithm_rejected() {
        // ---
        clear_security_env();
        std::env::set_var("AUTH_TOKEN_ALGORITHM", "RS256");

        assert_invalid_config!(SecurityConfig::from_env(), "AUTH_TOKEN_ALGORITHM");

        clear_security_env();
    }

    #[test]
    #[serial]
    fn zero_login_attempts_rejected() {
        // ---
        clear_security_env();
        std::env::set_var("AUTH_MAX_LOGIN_ATTEMPTS", "0");

        assert_invalid_config!(SecurityConfig::from_env(), "AUTH_MAX_LOGIN_ATTEMPTS");

        clear_security_env();
    }

    #[test]
    #[serial]
    fn out_of_range_durations_rejected() {
        // ---
        for days in ["0", "3651", "4294967295"] {
            clear_security_env();
            std::env::set_var("AUTH_TOKEN_EXPIRY_DAYS", days);
            assert_invalid_config!(SecurityConfig::from_env(), "AUTH_TOKEN_EXPIRY_DAYS");
        }

        for minutes in ["0", "525601", "4294967295"] {
            clear_security_env();
            std::env::set_var("AUTH_LOCKOUT_MINUTES", minutes);
            assert_invalid_config!(SecurityConfig::from_env(), "AUTH_LOCKOUT_MINUTES");
        }

        clear_security_env();
    }

    #[test]
    #[serial]
    fn duration_bounds_accepted() -> Result<()> {
        // ---
        clear_security_env();
        std::env::set_var("AUTH_TOKEN_EXPIRY_DAYS", "3650");
        std::env::set_var("AUTH_LOCKOUT_MINUTES", "525600");

        let config = SecurityConfig::from_env()?;
        assert_eq!(config.token_expiry, chrono::Duration::days(3650));
        assert_eq!(config.lockout_duration, chrono::Duration::minutes(525_600));

        clear_security_env();
        Ok(())
    }

    #[test]
    fn debug_output_redacts_secret() {
        // ---
        let cfg = SecurityConfig {
            secret_key: "do-not-print".to_string(),
            ..SecurityConfig::default()
        };

        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("do-not-print"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    #[serial]
    fn app_config_from_env_success() -> Result<()> {
        // ---
        clear_security_env();
        std::env::remove_var("AUTH_METRICS_TYPE");
        std::env::set_var("DATABASE_URL", "sqlite::memory:");

        let cfg = AppConfig::from_env()?;
        assert_eq!(cfg.database.database_url, "sqlite::memory:");
        assert_eq!(cfg.security.max_login_attempts, 3);
        assert_eq!(cfg.metrics.backend, MetricsBackend::Noop);

        std::env::remove_var("DATABASE_URL");
        Ok(())
    }

    #[test]
    #[serial]
    fn metrics_backend_selection() -> Result<()> {
        // ---
        std::env::set_var("AUTH_METRICS_TYPE", "prom");
        assert_eq!(MetricsConfig::from_env()?.backend, MetricsBackend::Prometheus);

        std::env::set_var("AUTH_METRICS_TYPE", "statsd");
        assert_invalid_config!(MetricsConfig::from_env(), "AUTH_METRICS_TYPE");

        std::env::remove_var("AUTH_METRICS_TYPE");
        assert_eq!(MetricsConfig::from_env()?.backend, MetricsBackend::Noop);
        Ok(())
    }
}
