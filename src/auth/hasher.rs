//! Argon2id password hashing.
//!
//! Hashing is CPU-bound and deliberately slow, so both directions run on
//! tokio's blocking pool instead of the caller's task.
//!
//! Databases written by the earlier desktop build hold bcrypt hashes
//! (`$2a$`, `$2b$`, `$2y$`). Those still verify, and [`CredentialHasher::needs_rehash`]
//! tells the caller to replace them with Argon2id after a successful login.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tokio::task;

use crate::config::SecurityConfig;
use crate::domain::AuthError;

const BCRYPT_PREFIXES: [&str; 3] = ["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(stored_hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|p| stored_hash.starts_with(p))
}

#[derive(Clone)]
pub struct CredentialHasher {
    // ---
    params: Params,
}

impl CredentialHasher {
    // ---
    /// # Errors
    /// Returns [`AuthError::Hashing`] if the configured work factor is invalid.
    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        // ---
        let params = config
            .argon2_params()
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(Self { params })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    /// Hash with a freshly generated salt; returns a PHC string.
    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        // ---
        let password = password.to_string();
        let params = self.params.clone();

        task::spawn_blocking(move || {
            //
            let salt = SaltString::generate(&mut OsRng);
            Self::argon2(params)
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::Hashing(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
    }

    /// Check a password against a stored Argon2 PHC string or legacy bcrypt hash.
    ///
    /// A stored value in neither format never matches.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        // ---
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        let params = self.params.clone();

        task::spawn_blocking(move || {
            //
            if is_bcrypt(&stored_hash) {
                return bcrypt::verify(&password, &stored_hash).unwrap_or(false);
            }

            let parsed = match PasswordHash::new(&stored_hash) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::warn!("Stored password hash is not a PHC string: {}", e);
                    return false;
                }
            };

            // Parameters embedded in the stored hash take precedence over `params`.
            Self::argon2(params)
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .await
        .map_err(|e| AuthError::Hashing(format!("verification task failed: {e}")))
    }

    /// True for legacy bcrypt hashes, which should be replaced once the
    /// plaintext is known.
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        is_bcrypt(stored_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        let config = SecurityConfig {
            argon2_memory_kib: 256,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        };
        CredentialHasher::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = fast_hasher();

        let hash = hasher.hash("Sup3r$ecret!").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Sup3r$ecret!"));

        assert!(hasher.verify("Sup3r$ecret!", &hash).await.unwrap());
        assert!(!hasher.verify("sup3r$ecret!", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let hasher = fast_hasher();

        let first = hasher.hash("admin123").await.unwrap();
        let second = hasher.hash("admin123").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn legacy_bcrypt_hashes_verify() {
        let hasher = fast_hasher();

        for version in [bcrypt::Version::TwoB, bcrypt::Version::TwoA, bcrypt::Version::TwoY] {
            let legacy = bcrypt::hash_with_result("admin123", 4)
                .unwrap()
                .format_for_version(version);
            assert!(hasher.verify("admin123", &legacy).await.unwrap(), "{legacy}");
            assert!(!hasher.verify("admin124", &legacy).await.unwrap(), "{legacy}");
            assert!(hasher.needs_rehash(&legacy));
        }

        let current = hasher.hash("admin123").await.unwrap();
        assert!(!hasher.needs_rehash(&current));
    }

    #[tokio::test]
    async fn unknown_hash_formats_never_match() {
        let hasher = fast_hasher();

        // Truncated bcrypt: recognised by prefix but not parseable.
        assert!(!hasher.verify("admin123", "$2b$12$short").await.unwrap());
        assert!(!hasher.verify("admin123", "5f4dcc3b5aa765d61d8327deb882cf99").await.unwrap());
        assert!(!hasher.verify("admin123", "").await.unwrap());
    }

    #[test]
    fn invalid_work_factor_rejected() {
        let config = SecurityConfig {
            argon2_memory_kib: 1,
            ..SecurityConfig::default()
        };

        assert!(matches!(
            CredentialHasher::from_config(&config),
            Err(AuthError::Hashing(_))
        ));
    }
}
