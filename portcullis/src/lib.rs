//! # Portcullis
//!
//! Portcullis is a login-attempt throttling and account-expiry gate for
//! authentication pipelines. It does not verify credentials itself; the host
//! reports each attempt's method and outcome, and portcullis decides whether
//! the attempt may proceed:
//!
//! - an account whose configured expiry time has passed is rejected outright
//! - once a user accumulates a configured number of consecutive failures,
//!   further attempts are refused until the refusal window elapses
//! - a successful login, or an expired window, resets the failure count
//!
//! State is durable and re-read on every attempt, so concurrent gates in
//! separate processes share one source of truth and operator edits take
//! effect immediately.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use portcullis::{
//!     AuthEvent, AuthMethod, AuthStatus, FileRepositoryProvider, Portcullis, StoreLayout,
//!     ThrottleConfig,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let layout = StoreLayout::new("/var/lib/portcullis");
//! let repositories = Arc::new(FileRepositoryProvider::new(layout));
//! let gate = Portcullis::new(repositories, ThrottleConfig::from_minutes(3, 10));
//!
//! let event = AuthEvent::new("alice", AuthMethod::Password, AuthStatus::Failed);
//! if let Err(err) = gate.on_authentication(&event).await {
//!     // Fatal for this attempt only; surface it to the client and abort.
//!     eprintln!("login aborted: {err}");
//! }
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portcullis_core::{
    repositories::{
        AccountExpiryRepositoryProvider, LoginAttemptRepositoryProvider, RepositoryProvider,
    },
    services::{AccountExpiryService, AttemptTrackerService, Decision},
};

/// Re-export core types from portcullis_core
///
/// These types are commonly used when working with the Portcullis API.
pub use portcullis_core::{
    AuthError, AuthEvent, AuthEventHandler, AuthMethod, AuthOutcome, AuthStatus, Error,
    ExpiryRecord, FailureRecord, Privilege, StorageError, ThrottleConfig,
};

/// Re-export service types surfaced by the gate API
pub use portcullis_core::services::ThrottleStatus;

/// Re-export the flat-file storage backend
pub use portcullis_storage_file::{FileRepositoryProvider, StoreLayout};

/// The assembled authentication gate.
///
/// Composes the attempt tracker and the expiry registry over one repository
/// provider. An optional inner [`AuthEventHandler`] is always invoked before
/// the gate applies its own policy, so gates chain instead of replacing each
/// other.
pub struct Portcullis<R: RepositoryProvider> {
    repositories: Arc<R>,
    attempt_tracker: AttemptTrackerService<R::AttemptRepo>,
    expiry_registry: AccountExpiryService<R::ExpiryRepo>,
    inner: Option<Arc<dyn AuthEventHandler>>,
}

impl<R: RepositoryProvider> Portcullis<R> {
    pub fn new(repositories: Arc<R>, config: ThrottleConfig) -> Self {
        let attempt_tracker =
            AttemptTrackerService::new(repositories.login_attempts(), config);
        let expiry_registry = AccountExpiryService::new(repositories.account_expiries());
        Self {
            repositories,
            attempt_tracker,
            expiry_registry,
            inner: None,
        }
    }

    /// Chain an inner handler, invoked first on every attempt.
    pub fn with_inner_handler(mut self, inner: Arc<dyn AuthEventHandler>) -> Self {
        self.inner = Some(inner);
        self
    }

    /// Gate one authentication attempt.
    ///
    /// Called once per attempt with the host's own outcome. Returns `Ok(())`
    /// to let that outcome stand; an error aborts the attempt. Errors from
    /// this path are fatal for the attempt only and must not take down the
    /// host process.
    pub async fn on_authentication(&self, event: &AuthEvent) -> Result<(), Error> {
        if let Some(inner) = &self.inner {
            inner.on_authentication(event).await?;
        }

        if !event.method.is_covered() {
            return Ok(());
        }

        self.repositories.initialize().await?;

        // Still negotiating; nothing to record yet.
        let Some(outcome) = event.status.outcome() else {
            return Ok(());
        };

        if self
            .expiry_registry
            .is_expired(&event.username, Utc::now())
            .await?
        {
            tracing::info!(
                username = %event.username,
                remote_addr = event.remote_addr.as_deref(),
                "rejecting login for expired account"
            );
            return Err(AuthError::AccountExpired.into());
        }

        match self
            .attempt_tracker
            .evaluate_and_update(&event.username, outcome)
            .await?
        {
            Decision::Refuse { retry_after } => {
                tracing::info!(
                    username = %event.username,
                    remote_addr = event.remote_addr.as_deref(),
                    "refusing login attempt"
                );
                Err(AuthError::Refused { retry_after }.into())
            }
            Decision::Allow => Ok(()),
        }
    }

    /// Set or replace the expiry time for a username. Superuser only.
    pub async fn set_expire_time(
        &self,
        privilege: Privilege,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        self.repositories.initialize().await?;
        self.expiry_registry
            .set_expiry(privilege, username, expires_at)
            .await
    }

    /// Clear the expiry time for a username. Superuser only; no-op if none
    /// is configured.
    pub async fn reset_expire_time(
        &self,
        privilege: Privilege,
        username: &str,
    ) -> Result<(), Error> {
        self.repositories.initialize().await?;
        self.expiry_registry.clear_expiry(privilege, username).await
    }

    /// Look up the configured expiry time for a username. Superuser only.
    pub async fn get_expire_time(
        &self,
        privilege: Privilege,
        username: &str,
    ) -> Result<Option<DateTime<Utc>>, Error> {
        self.repositories.initialize().await?;
        self.expiry_registry.get_expiry(privilege, username).await
    }

    /// Read-only throttling snapshot for a username.
    pub async fn throttle_status(&self, username: &str) -> Result<ThrottleStatus, Error> {
        self.repositories.initialize().await?;
        self.attempt_tracker.status(username, Utc::now()).await
    }
}

#[async_trait]
impl<R: RepositoryProvider> AuthEventHandler for Portcullis<R> {
    async fn on_authentication(&self, event: &AuthEvent) -> Result<(), Error> {
        Portcullis::on_authentication(self, event).await
    }
}
