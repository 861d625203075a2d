//! Repository trait for consecutive-failure tracking.

use async_trait::async_trait;

use crate::{Error, records::FailureRecord};

/// Repository for per-user failure records.
///
/// Implementations own the durable mapping from username to failure state.
/// Every call re-reads durable storage; nothing is cached between calls, so
/// external mutation of the store is visible on the next attempt.
///
/// Two concurrent failures for the same user may each read the same count
/// and write the same increment, under-counting by one. That lost update is
/// accepted degraded behavior; mutations must still be atomic so the store
/// itself is never corrupted.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Look up the failure record for a username.
    ///
    /// Returns `None` for a clean user. The identifier is matched exactly,
    /// never by substring.
    async fn find(&self, username: &str) -> Result<Option<FailureRecord>, Error>;

    /// Insert or replace the failure record for `record.username`.
    async fn upsert(&self, record: &FailureRecord) -> Result<(), Error>;

    /// Delete the failure record for a username. No-op if absent.
    async fn remove(&self, username: &str) -> Result<(), Error>;
}
