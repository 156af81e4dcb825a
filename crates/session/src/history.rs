//! Append-only record log, rewritten in full to a JSON file on every append.
//!
//! The file is replaced atomically (temporary sibling + rename), so a crash
//! mid-write can only lose the latest append, never corrupt earlier records.
//! A failed write rolls the in-memory append back, keeping memory and disk in
//! step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PersistenceError;

/// A record type stored in a [`HistoryLog`].
pub trait LogRecord: Serialize {
    /// Called once on append with the record's 1-based position.
    /// Records without a sequence number ignore it.
    fn assign_sequence(&mut self, _sequence: u32) {}
}

#[derive(Debug)]
pub struct HistoryLog<T> {
    path: PathBuf,
    records: Vec<T>,
}

impl<T: LogRecord> HistoryLog<T> {
    /// An empty log backed by `path`. Nothing touches disk until the first
    /// append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record and remove the backing file.
    pub fn reset(&mut self) -> Result<(), PersistenceError> {
        self.records.clear();
        self.remove_file()
    }

    /// Append `record` and rewrite the backing file.
    pub fn append(&mut self, mut record: T) -> Result<&T, PersistenceError> {
        let sequence = self.records.len() as u32 + 1;
        record.assign_sequence(sequence);
        self.records.push(record);

        if let Err(e) = self.persist() {
            self.records.pop();
            warn!(path = %self.path.display(), error = %e, "Log append rolled back");
            return Err(e);
        }

        debug!(path = %self.path.display(), len = self.records.len(), "Log persisted");
        Ok(&self.records[self.records.len() - 1])
    }

    /// Every record, oldest first.
    pub fn all(&self) -> &[T] {
        &self.records
    }

    /// The last `min(n, len)` records, oldest first.
    pub fn recent(&self, n: usize) -> &[T] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    pub fn last(&self) -> Option<&T> {
        self.records.last()
    }

    /// Remove the backing file. In-memory records are kept.
    pub fn dispose(&mut self) -> Result<(), PersistenceError> {
        self.remove_file()
    }

    fn persist(&self) -> Result<(), PersistenceError> {
        let mut buf = serde_json::to_string_pretty(&self.records)?;
        buf.push('\n');

        let tmp = self.tmp_path();
        fs::write(&tmp, buf).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            PersistenceError::Io {
                path: tmp.clone(),
                source,
            }
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| {
            let _ = fs::remove_file(&tmp);
            PersistenceError::Io {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// Remove the log file and any temporary left by an interrupted write.
    fn remove_file(&self) -> Result<(), PersistenceError> {
        let tmp = self.tmp_path();
        if let Err(e) = fs::remove_file(&tmp) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %e, "Failed to remove temporary log");
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Log file removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "history".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Numbered {
        seq: u32,
        text: String,
    }

    impl LogRecord for Numbered {
        fn assign_sequence(&mut self, sequence: u32) {
            self.seq = sequence;
        }
    }

    fn numbered(text: &str) -> Numbered {
        Numbered {
            seq: 0,
            text: text.to_string(),
        }
    }

    fn read_back(path: &Path) -> Vec<Numbered> {
        serde_json::from_str(&fs::read_to_string(path).expect("read log")).expect("parse log")
    }

    #[test]
    fn test_append_assigns_contiguous_sequence_and_persists() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("log.json");
        let mut log = HistoryLog::new(&path);

        assert!(!path.exists());
        for text in ["a", "b", "c"] {
            log.append(numbered(text)).expect("append");
        }

        let seqs: Vec<u32> = log.all().iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(read_back(&path), log.all());
        assert!(!temp.path().join("log.json.tmp").exists());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut log = HistoryLog::new(temp.path().join("missing").join("log.json"));

        let err = log.append(numbered("lost")).unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
        assert!(log.is_empty());
    }

    #[test]
    fn test_recent_returns_tail_oldest_first() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut log = HistoryLog::new(temp.path().join("log.json"));
        for text in ["a", "b", "c", "d"] {
            log.append(numbered(text)).expect("append");
        }

        let tail: Vec<&str> = log.recent(2).iter().map(|r| r.text.as_str()).collect();
        assert_eq!(tail, vec!["c", "d"]);
        assert_eq!(log.recent(10).len(), 4);
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn test_reset_and_dispose_are_idempotent() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("log.json");
        let mut log = HistoryLog::new(&path);

        log.reset().expect("reset without file");
        log.dispose().expect("dispose without file");

        log.append(numbered("a")).expect("append");
        assert!(path.exists());

        log.dispose().expect("dispose");
        log.dispose().expect("dispose again");
        assert!(!path.exists());
        assert_eq!(log.len(), 1);

        log.reset().expect("reset");
        assert!(log.is_empty());

        // Numbering restarts after a reset
        let first = log.append(numbered("b")).expect("append");
        assert_eq!(first.seq, 1);
    }

    #[test]
    fn test_dispose_removes_leftover_temporary() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("log.json");
        let tmp = temp.path().join("log.json.tmp");
        let mut log: HistoryLog<Numbered> = HistoryLog::new(&path);

        fs::write(&tmp, "[").expect("write partial");
        log.dispose().expect("dispose");
        assert!(!tmp.exists());

        fs::write(&tmp, "[").expect("write partial");
        log.reset().expect("reset");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_failed_rename_leaves_no_temporary() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("log.json");
        // A non-empty directory in the way makes the rename fail
        fs::create_dir(&path).expect("mkdir");
        fs::write(path.join("keep"), "x").expect("write");
        let mut log = HistoryLog::new(&path);

        assert!(log.append(numbered("a")).is_err());
        assert!(log.is_empty());
        assert!(!temp.path().join("log.json.tmp").exists());
    }
}
