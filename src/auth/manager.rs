use chrono::{DateTime, Utc};
use std::time::Instant;

use super::{
    AuditLog, CredentialHasher, LockoutStatus, LockoutTracker, PasswordPolicy, TokenPayload,
    TokenService,
};
use crate::config::SecurityConfig;
use crate::domain::{
    AuditAction, AuditLogEntry, AuthError, ClockPtr, CredentialStorePtr, LoginOutcome,
    MetricsPtr, NewUser, Role, TokenError, User,
};

/// Username of the account created by [`AuthManager::ensure_admin_exists`].
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Well-known bootstrap password. The account is flagged as requiring a
/// password change, but nothing forces one.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Recorded in audit details when the caller supplied no source address.
const UNKNOWN_SOURCE: &str = "unknown";

/// Registration, login, token checks and password changes over one
/// credential store.
pub struct AuthManager {
    // ---
    store: CredentialStorePtr,
    hasher: CredentialHasher,
    policy: PasswordPolicy,
    lockout: LockoutTracker,
    tokens: TokenService,
    audit: AuditLog,
    metrics: MetricsPtr,
    clock: ClockPtr,
}

impl AuthManager {
    // ---
    /// Construction does not touch the store. Call
    /// [`ensure_admin_exists`](Self::ensure_admin_exists) afterwards to seed
    /// the bootstrap account.
    ///
    /// # Errors
    /// Returns [`AuthError::Hashing`] if the Argon2 work factor is invalid.
    pub fn new(
        config: &SecurityConfig,
        store: CredentialStorePtr,
        metrics: MetricsPtr,
        clock: ClockPtr,
    ) -> Result<Self, AuthError> {
        // ---
        Ok(Self {
            hasher: CredentialHasher::from_config(config)?,
            policy: PasswordPolicy::from_config(config),
            lockout: LockoutTracker::from_config(config),
            tokens: TokenService::new(config, clock.clone()),
            audit: AuditLog::new(store.clone(), clock.clone()),
            store,
            metrics,
            clock,
        })
    }

    /// Create the `admin` account if no user by that name exists.
    ///
    /// Returns `true` if the account was created by this call.
    pub async fn ensure_admin_exists(&self) -> Result<bool, AuthError> {
        // ---
        if self
            .store
            .find_user_by_username(DEFAULT_ADMIN_USERNAME)
            .await?
            .is_some()
        {
            tracing::debug!("Admin account already present");
            return Ok(false);
        }

        let admin = self
            .register(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, Role::Admin)
            .await?;
        self.store
            .set_requires_password_change(admin.id, true)
            .await?;

        tracing::warn!(
            "Created default '{}' account with the bootstrap password; change it",
            DEFAULT_ADMIN_USERNAME
        );
        Ok(true)
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        // ---
        self.policy.validate(password)?;

        if self.store.find_user_by_username(username).await?.is_some() {
            tracing::info!("Registration refused, username taken: {}", username);
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hash_password(password).await?;
        let now = self.clock.now();

        // A concurrent insert of the same name still fails on the UNIQUE constraint.
        let id = self
            .store
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash: password_hash.clone(),
                role,
                created_at: now,
                password_changed_at: now,
            })
            .await?;

        self.audit
            .append(
                Some(id),
                AuditAction::UserRegistered,
                format!("User {username} registered with role {role}"),
                None,
            )
            .await;
        self.metrics.record_registration();
        tracing::info!("Registered user {} (id {}) with role {}", username, id, role);

        Ok(User {
            id,
            username: username.to_string(),
            password_hash,
            role,
            created_at: now,
            last_login: None,
            login_attempts: 0,
            locked_until: None,
            password_changed_at: Some(now),
            requires_password_change: false,
        })
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown usernames and wrong passwords fail identically; only the
    /// audit trail tells them apart.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        source_address: Option<&str>,
    ) -> Result<String, AuthError> {
        // ---
        let now = self.clock.now();
        let source = source_address.unwrap_or(UNKNOWN_SOURCE);

        let Some(user) = self.store.find_user_by_username(username).await? else {
            self.audit
                .append(
                    None,
                    AuditAction::LoginFailed,
                    format!("Failed login attempt for user {username} from {source}"),
                    source_address,
                )
                .await;
            self.metrics.record_login(LoginOutcome::InvalidCredentials);
            tracing::warn!("Login failed for unknown user {} from {}", username, source);
            return Err(AuthError::InvalidCredentials);
        };

        self.refuse_if_locked(&user, now)?;

        if !self.verify_password(password, &user.password_hash).await? {
            self.record_failure(&user, now, source_address).await?;
            return Err(AuthError::InvalidCredentials);
        }

        let reset = self.lockout.on_success();
        self.store
            .update_lockout(user.id, reset.login_attempts, reset.locked_until)
            .await?;
        self.store.update_last_login(user.id, now).await?;
        self.upgrade_legacy_hash(&user, password).await;

        let token = self.tokens.issue(user.id, user.role)?;

        self.audit
            .append(
                Some(user.id),
                AuditAction::UserLogin,
                format!("Successful login from {source}"),
                source_address,
            )
            .await;
        self.metrics.record_login(LoginOutcome::Success);
        tracing::info!("User {} logged in from {}", username, source);

        Ok(token)
    }

    /// Signature and expiry only; the account is not re-checked.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.tokens.verify(token)
    }

    /// Replace a password after re-checking the current one.
    ///
    /// A wrong current password counts as a failed login attempt.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        // ---
        let now = self.clock.now();

        let Some(user) = self.store.find_user_by_username(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        self.refuse_if_locked(&user, now)?;

        if !self.verify_password(current_password, &user.password_hash).await? {
            self.record_failure(&user, now, None).await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.policy.validate(new_password)?;

        let password_hash = self.hash_password(new_password).await?;
        self.store
            .update_password(user.id, &password_hash, now)
            .await?;

        self.audit
            .append(
                Some(user.id),
                AuditAction::PasswordChanged,
                format!("Password changed for user {username}"),
                None,
            )
            .await;
        tracing::info!("Password changed for user {}", username);

        Ok(())
    }

    /// `None` for unknown usernames.
    pub async fn lockout_status(&self, username: &str) -> Result<Option<LockoutStatus>, AuthError> {
        // ---
        let user = self.store.find_user_by_username(username).await?;
        Ok(user.map(|user| self.lockout.status(&user, self.clock.now())))
    }

    /// Newest entries first.
    pub async fn recent_audit_entries(&self, limit: u32) -> Result<Vec<AuditLogEntry>, AuthError> {
        Ok(self.store.recent_audit_entries(limit).await?)
    }

    /// Counters recorded by this process in Prometheus text format. Empty
    /// under the no-op backend.
    pub fn render_metrics(&self) -> String {
        self.metrics.render()
    }

    // ============================================================
    // Internals
    // ============================================================

    fn refuse_if_locked(&self, user: &User, now: DateTime<Utc>) -> Result<(), AuthError> {
        // ---
        match self.lockout.active_lock(user, now) {
            Some(until) => {
                self.metrics.record_login(LoginOutcome::Locked);
                tracing::warn!("Refused attempt on locked account {} (until {})", user.username, until);
                Err(AuthError::AccountLocked { until })
            }
            None => Ok(()),
        }
    }

    async fn record_failure(
        &self,
        user: &User,
        now: DateTime<Utc>,
        source_address: Option<&str>,
    ) -> Result<(), AuthError> {
        // ---
        let source = source_address.unwrap_or(UNKNOWN_SOURCE);
        let update = self.lockout.on_failure(user, now);
        self.store
            .update_lockout(user.id, update.login_attempts, update.locked_until)
            .await?;

        self.audit
            .append(
                Some(user.id),
                AuditAction::LoginFailed,
                format!("Failed login attempt for user {} from {}", user.username, source),
                source_address,
            )
            .await;
        self.metrics.record_login(LoginOutcome::InvalidCredentials);
        tracing::warn!(
            "Wrong password for {} from {} ({} consecutive)",
            user.username,
            source,
            update.login_attempts
        );

        if let Some(until) = update.engaged_lock() {
            self.audit
                .append(
                    Some(user.id),
                    AuditAction::AccountLocked,
                    format!(
                        "Account {} locked until {} after {} failed attempts",
                        user.username,
                        until.to_rfc3339(),
                        update.login_attempts
                    ),
                    source_address,
                )
                .await;
            self.metrics.record_lockout();
            tracing::warn!("Account {} locked until {}", user.username, until);
        }

        Ok(())
    }

    /// Replace a legacy bcrypt hash with Argon2id while the plaintext is at
    /// hand. Failure leaves the old hash in place and the login proceeds.
    async fn upgrade_legacy_hash(&self, user: &User, password: &str) {
        // ---
        if !self.hasher.needs_rehash(&user.password_hash) {
            return;
        }

        let upgraded = match self.hash_password(password).await {
            Ok(hash) => self
                .store
                .update_password_hash(user.id, &hash)
                .await
                .map_err(AuthError::from),
            Err(e) => Err(e),
        };

        match upgraded {
            Ok(()) => {
                tracing::info!("Upgraded legacy bcrypt hash for {} to Argon2id", user.username)
            }
            Err(e) => {
                tracing::warn!("Could not upgrade legacy hash for {}: {:?}", user.username, e)
            }
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        // ---
        let start = Instant::now();
        let hash = self.hasher.hash(password).await;
        self.metrics.record_password_hash(start);
        hash
    }

    async fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        // ---
        let start = Instant::now();
        let matched = self.hasher.verify(password, stored_hash).await;
        self.metrics.record_password_hash(start);
        matched
    }
}
