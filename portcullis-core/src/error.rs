use chrono::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The account has a configured expiry time in the past. No retry hint:
    /// only an administrative reset makes the account usable again.
    #[error("account is expired")]
    AccountExpired,

    /// The failure threshold was reached within the refusal window.
    /// `retry_after` is `None` when the window is indefinite.
    #[error("too many failed login attempts{}", retry_hint(.retry_after))]
    Refused { retry_after: Option<Duration> },

    /// An administrative call was made without superuser privilege.
    #[error("must be superuser to manage login expiry")]
    PermissionDenied,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("unsupported username {0:?}: whitespace is not allowed")]
    InvalidUsername(String),
}

fn retry_hint(retry_after: &Option<Duration>) -> String {
    match retry_after {
        Some(window) => format!(", retry after {} minute(s)", window.num_minutes().max(1)),
        None => String::new(),
    }
}

impl Error {
    /// Whether this error must abort the in-progress authentication attempt.
    ///
    /// Fatal errors terminate the attempt only, never the host process.
    /// `PermissionDenied` is returned to an administrative caller as an
    /// ordinary error and is the one non-fatal case.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Auth(AuthError::PermissionDenied))
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
