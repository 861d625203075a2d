//! Line-oriented record store.
//!
//! Each store is a plain-text file with one record per line, fields
//! space-separated, and one leading space retained for compatibility with
//! stores written by earlier tooling. The identifier is always the first
//! whitespace-delimited token of a line and is matched exactly, never by
//! substring, so `bob` can never match inside `bobby`.
//!
//! Mutations stream the surviving lines into a uniquely named temp file in
//! the same directory and rename it over the original, so a store is never
//! left truncated or partially written, and concurrent writers cannot
//! interleave partial content. Readers re-open the file on every call and
//! tolerate a concurrent replace finishing mid-scan.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use portcullis_core::{Error, StorageError};
use tempfile::NamedTempFile;

/// A record kind persisted by a [`RecordStore`].
pub trait StoreRecord: Sized + Send + Sync {
    /// The identifier field, matched against the first token of each line.
    fn key(&self) -> &str;

    /// Encode as a store line, without the trailing newline.
    fn to_line(&self) -> String;

    /// Decode a store line. `None` for malformed lines; the store skips and
    /// logs those rather than failing the scan.
    fn parse_line(line: &str) -> Option<Self>;
}

/// Durable mapping from username to one fixed-shape record.
pub struct RecordStore<R: StoreRecord> {
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: StoreRecord> RecordStore<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty store if none exists. Idempotent.
    pub fn ensure_exists(&self) -> Result<(), Error> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|err| self.unavailable("create", err))?;
        Ok(())
    }

    /// Linear scan for the record whose identifier equals `username`.
    ///
    /// First well-formed match wins. Record counts are expected to stay
    /// small (active or recently-failed users only), so O(n) is fine here.
    pub fn find(&self, username: &str) -> Result<Option<R>, Error> {
        let file = File::open(&self.path)
            .map_err(|err| self.unavailable("open", err))?;

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| self.unavailable("read", err))?;
            if !line_matches(&line, username) {
                continue;
            }
            match R::parse_line(&line) {
                Some(record) => return Ok(Some(record)),
                None => {
                    tracing::warn!(
                        store = %self.path.display(),
                        line = index + 1,
                        "skipping malformed record line"
                    );
                }
            }
        }
        Ok(None)
    }

    /// Replace the record for `record.key()` or append it.
    ///
    /// Remove-then-append: the updated line lands at the end of the file,
    /// all other lines are preserved verbatim and in original order.
    pub fn upsert(&self, record: &R) -> Result<(), Error> {
        validate_username(record.key())?;
        self.rewrite(record.key(), Some(record))
    }

    /// Delete the record for `username`. No-op if absent.
    pub fn remove(&self, username: &str) -> Result<(), Error> {
        self.rewrite(username, None)
    }

    /// Stream surviving lines into a temp file, then atomically rename it
    /// over the store. No intermediate buffer is sized from the original
    /// file length, so growth is handled the same as shrinkage.
    ///
    /// Writers serialize on a sidecar lock file for the whole
    /// read-modify-replace cycle; the lock file itself is never renamed, so
    /// the lock stays valid across the replace. Readers do not take the
    /// lock.
    fn rewrite(&self, key: &str, replacement: Option<&R>) -> Result<(), Error> {
        let _guard = self.lock_for_write()?;
        let source = File::open(&self.path)
            .map_err(|err| self.unavailable("open", err))?;
        let directory = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(directory)
            .map_err(|err| self.unavailable("stage", err))?;

        for line in BufReader::new(source).lines() {
            let line = line.map_err(|err| self.unavailable("read", err))?;
            if line_matches(&line, key) {
                continue;
            }
            writeln!(staged, "{line}").map_err(|err| self.unavailable("write", err))?;
        }
        if let Some(record) = replacement {
            writeln!(staged, "{}", record.to_line())
                .map_err(|err| self.unavailable("write", err))?;
        }

        staged
            .persist(&self.path)
            .map_err(|err| self.unavailable("replace", err.error))?;
        Ok(())
    }

    /// Take the exclusive writer lock. Released when the handle is dropped.
    fn lock_for_write(&self) -> Result<File, Error> {
        let lock_path = self.path.with_extension("lock");
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|err| self.unavailable("lock", err))?;
        lock.lock().map_err(|err| self.unavailable("lock", err))?;
        Ok(lock)
    }

    fn unavailable(&self, action: &str, err: std::io::Error) -> Error {
        tracing::warn!(
            store = %self.path.display(),
            action = action,
            error = %err,
            "record store unavailable"
        );
        StorageError::Unavailable(format!("{} {}: {err}", action, self.path.display())).into()
    }
}

fn line_matches(line: &str, key: &str) -> bool {
    line.split_whitespace().next() == Some(key)
}

fn validate_username(username: &str) -> Result<(), Error> {
    if username.is_empty() || username.chars().any(char::is_whitespace) {
        return Err(StorageError::InvalidUsername(username.to_string()).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use portcullis_core::FailureRecord;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> RecordStore<FailureRecord> {
        RecordStore::new(dir.path().join("login_refuse"))
    }

    fn record(username: &str, count: u32, timestamp: i64) -> FailureRecord {
        FailureRecord {
            username: username.into(),
            failure_count: count,
            last_failure_at: Utc.timestamp_opt(timestamp, 0).unwrap(),
        }
    }

    #[test]
    fn ensure_exists_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.ensure_exists().unwrap();
        store.ensure_exists().unwrap();
        assert!(store.path().exists());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "");
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store: RecordStore<FailureRecord> =
            RecordStore::new(dir.path().join("no-such-dir").join("login_refuse"));

        let err = store.ensure_exists().unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn find_on_missing_store_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.find("alice").unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn upsert_then_find_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        let alice = record("alice", 2, 1_700_000_000);
        store.upsert(&alice).unwrap();

        assert_eq!(store.find("alice").unwrap(), Some(alice));
        assert_eq!(store.find("bob").unwrap(), None);
    }

    #[test]
    fn lines_keep_the_historical_format() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        store.upsert(&record("alice", 2, 1_700_000_000)).unwrap();

        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            " alice 2 1700000000\n"
        );
    }

    #[test]
    fn upsert_replaces_and_preserves_other_lines_in_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        store.upsert(&record("alice", 1, 100)).unwrap();
        store.upsert(&record("bob", 1, 200)).unwrap();
        store.upsert(&record("carol", 1, 300)).unwrap();
        store.upsert(&record("bob", 2, 400)).unwrap();

        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            " alice 1 100\n carol 1 300\n bob 2 400\n"
        );
        assert_eq!(store.find("bob").unwrap().unwrap().failure_count, 2);
        assert_eq!(store.find("alice").unwrap().unwrap().failure_count, 1);
    }

    #[test]
    fn remove_deletes_only_the_matching_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        store.upsert(&record("alice", 1, 100)).unwrap();
        store.upsert(&record("bob", 1, 200)).unwrap();

        store.remove("alice").unwrap();
        assert_eq!(store.find("alice").unwrap(), None);
        assert!(store.find("bob").unwrap().is_some());

        // Removing an absent record is a no-op, not an error.
        store.remove("alice").unwrap();
    }

    #[test]
    fn prefix_usernames_never_cross_match() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        store.upsert(&record("bob", 1, 100)).unwrap();
        store.upsert(&record("bobby", 7, 200)).unwrap();

        assert_eq!(store.find("bob").unwrap().unwrap().failure_count, 1);
        assert_eq!(store.find("bobby").unwrap().unwrap().failure_count, 7);

        store.remove("bob").unwrap();
        assert_eq!(store.find("bob").unwrap(), None);
        assert_eq!(store.find("bobby").unwrap().unwrap().failure_count, 7);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            dir.path().join("login_refuse"),
            " alice not-a-number 100\n garbage\n bob 3 200\n",
        )
        .unwrap();

        assert_eq!(store.find("alice").unwrap(), None);
        assert_eq!(store.find("bob").unwrap().unwrap().failure_count, 3);
    }

    #[test]
    fn malformed_lines_survive_rewrites_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(dir.path().join("login_refuse"), " alice broken line\n").unwrap();

        store.upsert(&record("bob", 1, 100)).unwrap();

        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            " alice broken line\n bob 1 100\n"
        );
    }

    #[test]
    fn rewrite_handles_growth_beyond_original_length() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        store.upsert(&record("a", 1, 1)).unwrap();
        let long_name = "u".repeat(120);
        store.upsert(&record(&long_name, 123_456, 1_700_000_000)).unwrap();

        assert!(store.find(&long_name).unwrap().is_some());
        assert!(store.find("a").unwrap().is_some());
    }

    #[test]
    fn concurrent_upserts_to_unrelated_usernames_drop_nothing() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).ensure_exists().unwrap();
        let path = dir.path().join("login_refuse");

        let writers: Vec<_> = (0..8)
            .map(|worker| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store: RecordStore<FailureRecord> = RecordStore::new(path);
                    for round in 1..=5u32 {
                        store
                            .upsert(&record(&format!("user{worker}"), round, 1_700_000_000))
                            .unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store: RecordStore<FailureRecord> = RecordStore::new(path);
        for worker in 0..8 {
            let found = store.find(&format!("user{worker}")).unwrap().unwrap();
            assert_eq!(found.failure_count, 5);
        }
    }

    #[test]
    fn usernames_with_whitespace_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.ensure_exists().unwrap();

        let err = store.upsert(&record("al ice", 1, 100)).unwrap_err();
        assert!(matches!(
            err,
            Error::Storage(StorageError::InvalidUsername(_))
        ));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "");
    }
}
