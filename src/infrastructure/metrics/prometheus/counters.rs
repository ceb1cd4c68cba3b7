use metrics::{counter, histogram};
use std::time::Instant;

/// Increment the registrations counter.
pub fn increment_registrations() {
    counter!("auth_registrations_total").increment(1);
}

/// Increment the login counter, labelled by outcome.
pub fn increment_logins(outcome: &'static str) {
    counter!("auth_logins_total", "outcome" => outcome).increment(1);
    if outcome != "success" {
        counter!("auth_login_failures_total").increment(1);
    }
}

/// Increment the lockouts counter.
pub fn increment_lockouts() {
    counter!("auth_lockouts_total").increment(1);
}

/// Track password hash/verify latency using a histogram.
pub fn track_password_hash(start: Instant) {
    let elapsed = start.elapsed();
    histogram!("auth_password_hash_seconds").record(elapsed);
}
