//! Flat-file implementation of the login attempt repository.

use async_trait::async_trait;
use chrono::DateTime;
use portcullis_core::{
    Error, FailureRecord, repositories::LoginAttemptRepository,
};

use crate::store::{RecordStore, StoreRecord};

/// Failure-store line: `" <username> <failure_count> <last_failure_unix_time>"`.
impl StoreRecord for FailureRecord {
    fn key(&self) -> &str {
        &self.username
    }

    fn to_line(&self) -> String {
        format!(
            " {} {} {}",
            self.username,
            self.failure_count,
            self.last_failure_at.timestamp()
        )
    }

    fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let username = fields.next()?;
        let failure_count = fields.next()?.parse().ok()?;
        let timestamp: i64 = fields.next()?.parse().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some(FailureRecord {
            username: username.to_string(),
            failure_count,
            last_failure_at: DateTime::from_timestamp(timestamp, 0)?,
        })
    }
}

/// File-backed repository for failure records.
///
/// The store file is (re)created lazily before every operation, so a store
/// deleted or edited out from under a running gate heals on the next call.
pub struct FileLoginAttemptRepository {
    store: RecordStore<FailureRecord>,
}

impl FileLoginAttemptRepository {
    pub fn new(store: RecordStore<FailureRecord>) -> Self {
        Self { store }
    }

    /// Create the store file if it is missing.
    pub fn ensure_store(&self) -> Result<(), Error> {
        self.store.ensure_exists()
    }
}

#[async_trait]
impl LoginAttemptRepository for FileLoginAttemptRepository {
    async fn find(&self, username: &str) -> Result<Option<FailureRecord>, Error> {
        self.store.ensure_exists()?;
        self.store.find(username)
    }

    async fn upsert(&self, record: &FailureRecord) -> Result<(), Error> {
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
        assert!(FailureRecord::parse_line(" alice 2 1700000000").is_some());
        assert!(FailureRecord::parse_line(" alice two 1700000000").is_none());
        assert!(FailureRecord::parse_line(" alice 2 not-a-time").is_none());
        assert!(FailureRecord::parse_line(" alice 2").is_none());
        assert!(FailureRecord::parse_line(" alice 2 1700000000 extra").is_none());
        assert!(FailureRecord::parse_line("").is_none());
    }

    #[test]
    fn line_round_trips_at_second_precision() {
        let record = FailureRecord {
            username: "alice".into(),
            failure_count: 4,
            last_failure_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        assert_eq!(FailureRecord::parse_line(&record.to_line()), Some(record));
    }

    #[tokio::test]
    async fn repository_operations_heal_a_missing_store() {
        let dir = TempDir::new().unwrap();
        let repo = FileLoginAttemptRepository::new(RecordStore::new(
            dir.path().join("login_refuse"),
        ));

        // No store file yet; find creates one and sees a clean user.
        assert_eq!(repo.find("alice").await.unwrap(), None);

        let record = FailureRecord {
            username: "alice".into(),
            failure_count: 1,
            last_failure_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        repo.upsert(&record).await.unwrap();
        assert_eq!(repo.find("alice").await.unwrap(), Some(record));

        repo.remove("alice").await.unwrap();
        assert_eq!(repo.find("alice").await.unwrap(), None);
    }
}
