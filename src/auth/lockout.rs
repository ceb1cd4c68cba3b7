//! Failed-login counting and lock windows.
//!
//! The tracker never touches storage. It reads the counters off a [`User`]
//! snapshot and hands back the values to persist; expiry is evaluated
//! lazily against the supplied `now`.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::config::SecurityConfig;
use crate::domain::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LockState {
    Open,
    Locked,
}

/// Counter values to write back after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutUpdate {
    // ---
    pub login_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LockoutUpdate {
    // ---
    /// The lock expiry, if this update locks the account.
    pub fn engaged_lock(&self) -> Option<DateTime<Utc>> {
        self.locked_until
    }
}

/// Snapshot for display: how close an account is to being locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockoutStatus {
    // ---
    pub state: LockState,
    pub failed_attempts: u32,
    pub remaining_attempts: u32,
    pub locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct LockoutTracker {
    // ---
    max_attempts: u32,
    lockout_duration: Duration,
}

impl LockoutTracker {
    // ---
    pub fn new(max_attempts: u32, lockout_duration: Duration) -> Self {
        // ---
        Self {
            max_attempts: max_attempts.max(1),
            lockout_duration,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.max_login_attempts, config.lockout_duration)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The expiry of a lock still in force at `now`.
    pub fn active_lock(&self, user: &User, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        user.locked_until.filter(|until| *until > now)
    }

    pub fn state(&self, user: &User, now: DateTime<Utc>) -> LockState {
        // ---
        match self.active_lock(user, now) {
            Some(_) => LockState::Locked,
            None => LockState::Open,
        }
    }

    pub fn is_locked(&self, user: &User, now: DateTime<Utc>) -> bool {
        self.state(user, now) == LockState::Locked
    }

    /// Counters after one more failed attempt.
    ///
    /// The count only resets on success, so once the threshold has been
    /// reached every further failure renews the lock.
    pub fn on_failure(&self, user: &User, now: DateTime<Utc>) -> LockoutUpdate {
        // ---
        let login_attempts = user.login_attempts.saturating_add(1);
        // Saturates rather than overflowing on an absurd lockout duration.
        let locked_until = (login_attempts >= self.max_attempts).then(|| {
            now.checked_add_signed(self.lockout_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC)
        });

        LockoutUpdate {
            login_attempts,
            locked_until,
        }
    }

    /// Counters after a successful login: always fully open.
    pub fn on_success(&self) -> LockoutUpdate {
        // ---
        LockoutUpdate {
            login_attempts: 0,
            locked_until: None,
        }
    }

    pub fn status(&self, user: &User, now: DateTime<Utc>) -> LockoutStatus {
        // ---
        let state = self.state(user, now);
        LockoutStatus {
            state,
            failed_attempts: user.login_attempts,
            remaining_attempts: match state {
                LockState::Locked => 0,
                LockState::Open => self.max_attempts.saturating_sub(user.login_attempts),
            },
            locked_until: self.active_lock(user, now),
        }
    }
}
