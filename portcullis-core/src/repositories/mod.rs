//! Repository traits for the data access layer
//!
//! This module defines the repository interfaces that services use to reach
//! durable storage. These traits provide a clean abstraction over the
//! underlying store implementation.
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each record
//!   kind
//! - Individual `*RepositoryProvider` traits provide access to each
//!   repository type
//! - [`RepositoryProvider`] is a supertrait combining the provider traits
//!   plus lifecycle methods
//!
//! Storage backends implement the full `RepositoryProvider` trait; services
//! depend only on the individual repository traits.

pub mod attempt;
pub mod expiry;

pub use attempt::LoginAttemptRepository;
pub use expiry::AccountExpiryRepository;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for login attempt repository access.
pub trait LoginAttemptRepositoryProvider: Send + Sync + 'static {
    /// The login attempt repository implementation type
    type AttemptRepo: LoginAttemptRepository;

    /// Get the login attempt repository
    fn login_attempts(&self) -> Arc<Self::AttemptRepo>;
}

/// Provider trait for account expiry repository access.
pub trait AccountExpiryRepositoryProvider: Send + Sync + 'static {
    /// The account expiry repository implementation type
    type ExpiryRepo: AccountExpiryRepository;

    /// Get the account expiry repository
    fn account_expiries(&self) -> Arc<Self::ExpiryRepo>;
}

/// Unified interface implemented by storage backends.
///
/// Combines repository access with store lifecycle. `initialize` is called
/// lazily on every gated attempt and must be cheap and idempotent.
#[async_trait]
pub trait RepositoryProvider:
    LoginAttemptRepositoryProvider + AccountExpiryRepositoryProvider
{
    /// Ensure the backing stores exist and are reachable.
    async fn initialize(&self) -> Result<(), Error>;

    /// Verify the backing stores can be opened.
    async fn health_check(&self) -> Result<(), Error>;
}
