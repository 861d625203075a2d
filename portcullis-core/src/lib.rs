//! Core functionality for the portcullis project
//!
//! This module contains the policy engine gating login attempts: the attempt
//! tracker that counts consecutive authentication failures per user, and the
//! expiry registry that holds per-user absolute account-expiry timestamps.
//!
//! The core crate defines the record types, the repository traits that
//! storage backends implement, and the services that drive policy decisions.
//! It performs no I/O of its own and is not intended to be used directly by
//! application code; see the `portcullis` crate for the assembled gate.
pub mod auth;
pub mod config;
pub mod error;
pub mod records;
pub mod repositories;
pub mod services;

pub use auth::{AuthEvent, AuthEventHandler, AuthMethod, AuthOutcome, AuthStatus, Privilege};
pub use config::ThrottleConfig;
pub use error::{AuthError, Error, StorageError};
pub use records::{ExpiryRecord, FailureRecord};
