//! Attempt tracker service for failure-count throttling.
//!
//! This module implements per-username tracking of consecutive
//! authentication failures with refusal once a configurable threshold is
//! reached within a configurable window.
//!
//! # State machine
//!
//! A user's state is derived entirely from their failure record:
//!
//! - **Clean**: no record.
//! - **Accumulating**: record exists, `failure_count < threshold`.
//! - **Refusing**: record exists, `failure_count >= threshold`, and the last
//!   failure is younger than the refusal window.
//! - **Expired-window**: record exists but the last failure is older than
//!   the window; treated as Clean on the next evaluation and dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use portcullis_core::services::AttemptTrackerService;
//! use portcullis_core::{AuthOutcome, ThrottleConfig};
//!
//! let tracker = AttemptTrackerService::new(repository, ThrottleConfig::from_minutes(3, 10));
//!
//! match tracker.evaluate_and_update("alice", AuthOutcome::Failure).await? {
//!     Decision::Refuse { retry_after } => { /* abort the attempt */ }
//!     Decision::Allow => { /* let the host outcome stand */ }
//! }
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::{
    Error,
    auth::AuthOutcome,
    config::ThrottleConfig,
    records::FailureRecord,
    repositories::LoginAttemptRepository,
};

/// The tracker's verdict for one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the host's own outcome stand.
    Allow,

    /// Abort the attempt. `retry_after` is the full refusal window, or
    /// `None` when the window is indefinite.
    Refuse { retry_after: Option<Duration> },
}

impl Decision {
    pub fn is_refused(&self) -> bool {
        matches!(self, Decision::Refuse { .. })
    }
}

/// Read-only throttling snapshot for a username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleStatus {
    pub username: String,

    /// Consecutive failures currently on record. Stale records count as
    /// zero.
    pub failed_attempts: u32,

    /// Whether an attempt made now would be refused.
    pub is_refusing: bool,

    /// Remaining refusal hint when refusing with a finite window.
    pub retry_after: Option<Duration>,
}

/// Service tracking consecutive authentication failures per username.
///
/// The service holds no cross-call state: every evaluation re-reads the
/// repository, so operator edits to the backing store take effect on the
/// next attempt.
pub struct AttemptTrackerService<R: LoginAttemptRepository> {
    repository: Arc<R>,
    config: ThrottleConfig,
}

impl<R: LoginAttemptRepository> AttemptTrackerService<R> {
    pub fn new(repository: Arc<R>, config: ThrottleConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Evaluate one authentication attempt and update the failure record.
    ///
    /// A user in the refusing state is refused before the outcome is even
    /// considered; a successful credential check does not bypass an active
    /// refusal window. Otherwise a success clears the record and a failure
    /// creates or increments it. The attempt that *caused* a failure is not
    /// itself gated; gating starts with the next attempt.
    pub async fn evaluate_and_update(
        &self,
        username: &str,
        outcome: AuthOutcome,
    ) -> Result<Decision, Error> {
        let now = Utc::now();

        if let Some(record) = self.repository.find(username).await? {
            let stale = self
                .config
                .window_expired(record.elapsed_since_failure(now));

            if record.failure_count >= self.config.failure_threshold && !stale {
                tracing::debug!(
                    username = %username,
                    failed_attempts = record.failure_count,
                    "refusing authentication attempt"
                );
                return Ok(Decision::Refuse {
                    retry_after: self.config.retry_after(),
                });
            }

            // Staleness clears the counter whether or not the threshold was
            // ever reached.
            if stale {
                tracing::debug!(username = %username, "dropping stale failure record");
                self.repository.remove(username).await?;
            }
        }

        match outcome {
            AuthOutcome::Success => {
                self.repository.remove(username).await?;
                Ok(Decision::Allow)
            }
            AuthOutcome::Failure => {
                let record = match self.repository.find(username).await? {
                    Some(previous) => previous.failed_again(now),
                    None => FailureRecord::first_failure(username, now),
                };
                tracing::debug!(
                    username = %username,
                    failed_attempts = record.failure_count,
                    "recording authentication failure"
                );
                self.repository.upsert(&record).await?;
                Ok(Decision::Allow)
            }
        }
    }

    /// Compute the current throttle status without mutating any record.
    pub async fn status(&self, username: &str, now: DateTime<Utc>) -> Result<ThrottleStatus, Error> {
        let record = self.repository.find(username).await?;
        Ok(self.compute_status(username, record.as_ref(), now))
    }

    fn compute_status(
        &self,
        username: &str,
        record: Option<&FailureRecord>,
        now: DateTime<Utc>,
    ) -> ThrottleStatus {
        let Some(record) = record else {
            return ThrottleStatus {
                username: username.to_string(),
                failed_attempts: 0,
                is_refusing: false,
                retry_after: None,
            };
        };

        let stale = self
            .config
            .window_expired(record.elapsed_since_failure(now));
        if stale {
            return ThrottleStatus {
                username: username.to_string(),
                failed_attempts: 0,
                is_refusing: false,
                retry_after: None,
            };
        }

        let is_refusing = record.failure_count >= self.config.failure_threshold;
        ThrottleStatus {
            username: username.to_string(),
            failed_attempts: record.failure_count,
            is_refusing,
            retry_after: if is_refusing {
                self.config.retry_after()
            } else {
                None
            },
        }
    }
}
