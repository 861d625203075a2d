use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Consecutive-failure state for one username.
///
/// A record exists if and only if at least one unresolved failure is on
/// record; "no record" means zero failures. Timestamps are persisted with
/// second precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub username: String,

    /// Consecutive failed attempts since the last success or reset.
    pub failure_count: u32,

    /// When the most recent failure was recorded.
    pub last_failure_at: DateTime<Utc>,
}

impl FailureRecord {
    /// The record created when a previously clean user fails.
    pub fn first_failure(username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            failure_count: 1,
            last_failure_at: now,
        }
    }

    /// The successor record after one more failure.
    pub fn failed_again(&self, now: DateTime<Utc>) -> Self {
        Self {
            username: self.username.clone(),
            failure_count: self.failure_count.saturating_add(1),
            last_failure_at: now,
        }
    }

    /// Time elapsed since the last recorded failure.
    pub fn elapsed_since_failure(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_failure_at
    }
}

/// Absolute account-expiry time for one username.
///
/// At most one record per username; absence means the account never expires
/// through this mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryRecord {
    pub username: String,

    /// The instant after which the account may no longer authenticate.
    pub expires_at: DateTime<Utc>,
}

impl ExpiryRecord {
    pub fn new(username: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            expires_at,
        }
    }

    /// Expiry comparison is inclusive: an account expires at exactly
    /// `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
