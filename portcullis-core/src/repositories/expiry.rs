//! Repository trait for account-expiry records.

use async_trait::async_trait;

use crate::{Error, records::ExpiryRecord};

/// Repository for per-user expiry records.
///
/// Records are written only through administrative calls and read, never
/// mutated, on the authentication path.
#[async_trait]
pub trait AccountExpiryRepository: Send + Sync + 'static {
    /// Look up the expiry record for a username. `None` means no expiry is
    /// configured.
    async fn find(&self, username: &str) -> Result<Option<ExpiryRecord>, Error>;

    /// Insert or replace the expiry record for `record.username`.
    async fn upsert(&self, record: &ExpiryRecord) -> Result<(), Error>;

    /// Delete the expiry record for a username. No-op if absent.
    async fn remove(&self, username: &str) -> Result<(), Error>;
}
