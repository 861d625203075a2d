//! Expiry registry service for absolute account expiry.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    auth::Privilege,
    records::ExpiryRecord,
    repositories::AccountExpiryRepository,
};

/// Service holding per-user absolute account-expiry timestamps.
///
/// Reads happen on every gated authentication attempt; writes happen only
/// through the administrative operations, which demand a superuser
/// capability from the caller.
pub struct AccountExpiryService<R: AccountExpiryRepository> {
    repository: Arc<R>,
}

impl<R: AccountExpiryRepository> AccountExpiryService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Whether the account is expired at `now`.
    ///
    /// No record means no expiry is configured and the account never expires
    /// through this mechanism. The comparison is inclusive.
    pub async fn is_expired(&self, username: &str, now: DateTime<Utc>) -> Result<bool, Error> {
        match self.repository.find(username).await? {
            Some(record) => Ok(record.is_expired_at(now)),
            None => Ok(false),
        }
    }

    /// Set or replace the expiry time for a username.
    pub async fn set_expiry(
        &self,
        privilege: Privilege,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        privilege.require_superuser()?;

        let record = ExpiryRecord::new(username, expires_at);
        self.repository.upsert(&record).await?;
        tracing::info!(
            username = %username,
            expires_at = %expires_at,
            "set account expiry"
        );
        Ok(())
    }

    /// Clear the expiry time for a username. No-op if none is configured.
    pub async fn clear_expiry(&self, privilege: Privilege, username: &str) -> Result<(), Error> {
        privilege.require_superuser()?;

        self.repository.remove(username).await?;
        tracing::info!(username = %username, "cleared account expiry");
        Ok(())
    }

    /// Look up the configured expiry time for a username.
    pub async fn get_expiry(
        &self,
        privilege: Privilege,
        username: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        privilege.require_superuser()?;

        Ok(self
            .repository
            .find(username)
            .await?
            .map(|record| record.expires_at))
    }
}
