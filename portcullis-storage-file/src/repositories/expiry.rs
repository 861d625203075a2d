//! Flat-file implementation of the account expiry repository.

use async_trait::async_trait;
use chrono::DateTime;
use portcullis_core::{
    Error, ExpiryRecord, repositories::AccountExpiryRepository,
};

use crate::store::{RecordStore, StoreRecord};

/// Expiry-store line: `" <username> <expire_unix_time>"`.
impl StoreRecord for ExpiryRecord {
    fn key(&self) -> &str {
        &self.username
    }

    fn to_line(&self) -> String {
        format!(" {} {}", self.username, self.expires_at.timestamp())
    }

    fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let username = fields.next()?;
        let timestamp: i64 = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some(ExpiryRecord {
            username: username.to_string(),
            expires_at: DateTime::from_timestamp(timestamp, 0)?,
        })
    }
}

/// File-backed repository for expiry records.
pub struct FileAccountExpiryRepository {
    store: RecordStore<ExpiryRecord>,
}

impl FileAccountExpiryRepository {
    pub fn new(store: RecordStore<ExpiryRecord>) -> Self {
        Self { store }
    }

    /// Create the store file if it is missing.
    pub fn ensure_store(&self) -> Result<(), Error> {
        self.store.ensure_exists()
    }
}

#[async_trait]
impl AccountExpiryRepository for FileAccountExpiryRepository {
    async fn find(&self, username: &str) -> Result<Option<ExpiryRecord>, Error> {
        self.store.ensure_exists()?;
        self.store.find(username)
    }

    async fn upsert(&self, record: &ExpiryRecord) -> Result<(), Error> {
        self.store.ensure_exists()?;
        self.store.upsert(record)
    }

    async fn remove(&self, username: &str) -> Result<(), Error> {
        self.store.ensure_exists()?;
        self.store.remove(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!(ExpiryRecord::parse_line(" alice 1700000000").is_some());
        assert!(ExpiryRecord::parse_line(" alice eventually").is_none());
        assert!(ExpiryRecord::parse_line(" alice").is_none());
        assert!(ExpiryRecord::parse_line(" alice 1700000000 extra").is_none());
    }

    #[test]
    fn line_round_trips_at_second_precision() {
        let record = ExpiryRecord {
            username: "alice".into(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        assert_eq!(ExpiryRecord::parse_line(&record.to_line()), Some(record));
    }

    #[tokio::test]
    async fn upsert_find_remove_round_trip() {
        let dir = TempDir::new().unwrap();
        let repo = FileAccountExpiryRepository::new(RecordStore::new(
            dir.path().join("login_expire_file"),
        ));

        let record = ExpiryRecord {
            username: "alice".into(),
            expires_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        repo.upsert(&record).await.unwrap();
        assert_eq!(repo.find("alice").await.unwrap(), Some(record.clone()));

        let updated = ExpiryRecord {
            expires_at: Utc.timestamp_opt(1_800_000_000, 0).unwrap(),
            ..record
        };
        repo.upsert(&updated).await.unwrap();
        assert_eq!(repo.find("alice").await.unwrap(), Some(updated));

        repo.remove("alice").await.unwrap();
        assert_eq!(repo.find("alice").await.unwrap(), None);
    }
}
