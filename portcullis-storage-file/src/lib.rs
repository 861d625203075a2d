//! Flat-file storage backend for portcullis.
//!
//! Both record kinds are kept as line-oriented plain-text files in one
//! state directory: `login_refuse` for failure records and
//! `login_expire_file` for expiry records. The format is shared with stores
//! written by earlier tooling, so operators can inspect and edit the files
//! directly; the engine re-reads them on every call.

pub mod repositories;
pub mod store;

pub use repositories::{FileAccountExpiryRepository, FileLoginAttemptRepository};
pub use store::{RecordStore, StoreRecord};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use portcullis_core::{
    Error, StorageError,
    repositories::{
        AccountExpiryRepositoryProvider, LoginAttemptRepositoryProvider, RepositoryProvider,
    },
};

/// File name of the failure store.
pub const FAILURE_STORE_FILE: &str = "login_refuse";

/// File name of the expiry store.
pub const EXPIRY_STORE_FILE: &str = "login_expire_file";

/// Environment variable naming the state directory.
pub const STATE_DIR_ENV: &str = "PORTCULLIS_STATE_DIR";

/// Location of the two store files.
///
/// Resolved once at startup and passed into the provider; nothing global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    state_dir: PathBuf,
}

impl StoreLayout {
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
        }
    }

    /// Resolve the layout from [`STATE_DIR_ENV`].
    pub fn from_env() -> Result<Self, Error> {
        match std::env::var_os(STATE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Ok(Self::new(PathBuf::from(dir))),
            _ => Err(StorageError::Unavailable(format!(
                "{STATE_DIR_ENV} is not set"
            ))
            .into()),
        }
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn failure_store(&self) -> PathBuf {
        self.state_dir.join(FAILURE_STORE_FILE)
    }

    pub fn expiry_store(&self) -> PathBuf {
        self.state_dir.join(EXPIRY_STORE_FILE)
    }
}

/// Repository provider backed by flat files.
pub struct FileRepositoryProvider {
    attempts: Arc<FileLoginAttemptRepository>,
    expiries: Arc<FileAccountExpiryRepository>,
}

impl FileRepositoryProvider {
    pub fn new(layout: StoreLayout) -> Self {
        Self {
            attempts: Arc::new(FileLoginAttemptRepository::new(RecordStore::new(
                layout.failure_store(),
            ))),
            expiries: Arc::new(FileAccountExpiryRepository::new(RecordStore::new(
                layout.expiry_store(),
            ))),
        }
    }
}

impl LoginAttemptRepositoryProvider for FileRepositoryProvider {
    type AttemptRepo = FileLoginAttemptRepository;

    fn login_attempts(&self) -> Arc<Self::AttemptRepo> {
        self.attempts.clone()
    }
}

impl AccountExpiryRepositoryProvider for FileRepositoryProvider {
    type ExpiryRepo = FileAccountExpiryRepository;

    fn account_expiries(&self) -> Arc<Self::ExpiryRepo> {
        self.expiries.clone()
    }
}

#[async_trait]
impl RepositoryProvider for FileRepositoryProvider {
    async fn initialize(&self) -> Result<(), Error> {
        self.attempts.ensure_store()?;
        self.expiries.ensure_store()?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        self.attempts.ensure_store()?;
        self.expiries.ensure_store()?;
        Ok(())
    }
}
