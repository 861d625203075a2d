use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The authentication method used for an attempt.
///
/// The policy engine only gates password-based methods; attempts made with
/// any other method pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthMethod {
    /// Plain password exchange.
    Password,

    /// Challenge-response exchange (e.g. SCRAM).
    ChallengeResponse,

    /// Hashed password exchange (e.g. MD5).
    Hashed,

    /// Any method the engine does not cover.
    Other,
}

impl AuthMethod {
    /// Whether attempts made with this method are subject to gating.
    pub fn is_covered(&self) -> bool {
        !matches!(self, AuthMethod::Other)
    }
}

/// The outcome of the host's own credential check for an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthStatus {
    /// Credentials verified.
    Ok,

    /// Credentials rejected.
    Failed,

    /// Anything else, e.g. the exchange is still negotiating.
    Other,
}

impl AuthStatus {
    /// The settled outcome, if the attempt has one yet.
    pub fn outcome(&self) -> Option<AuthOutcome> {
        match self {
            AuthStatus::Ok => Some(AuthOutcome::Success),
            AuthStatus::Failed => Some(AuthOutcome::Failure),
            AuthStatus::Other => None,
        }
    }
}

/// A settled authentication outcome driving the attempt tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Failure,
}

/// A single authentication attempt as reported by the host pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthEvent {
    /// The username presented for authentication.
    pub username: String,

    /// The authentication method in use.
    pub method: AuthMethod,

    /// The host's own outcome for the attempt.
    pub status: AuthStatus,

    /// Remote address of the connection, for log context.
    pub remote_addr: Option<String>,
}

impl AuthEvent {
    pub fn new(username: impl Into<String>, method: AuthMethod, status: AuthStatus) -> Self {
        Self {
            username: username.into(),
            method,
            status,
            remote_addr: None,
        }
    }

    pub fn with_remote_addr(mut self, remote_addr: impl Into<String>) -> Self {
        self.remote_addr = Some(remote_addr.into());
        self
    }
}

/// A handler invoked once per authentication attempt.
///
/// The gate implements this trait itself and can wrap another handler,
/// which it always invokes before applying its own policy. This keeps
/// handlers composable without a mutable global hook chain.
#[async_trait]
pub trait AuthEventHandler: Send + Sync + 'static {
    /// Observe an authentication attempt.
    ///
    /// Returning an error aborts the in-progress attempt.
    async fn on_authentication(&self, event: &AuthEvent) -> Result<(), Error>;
}

/// Capability presented by callers of administrative operations.
///
/// Privilege is derived by the host and passed per call; the engine never
/// consults global session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Superuser,
    Standard,
}

impl Privilege {
    pub fn is_superuser(&self) -> bool {
        matches!(self, Privilege::Superuser)
    }

    /// Fail with `PermissionDenied` unless the caller is a superuser.
    pub fn require_superuser(&self) -> Result<(), Error> {
        if self.is_superuser() {
            Ok(())
        } else {
            Err(crate::AuthError::PermissionDenied.into())
        }
    }
}
