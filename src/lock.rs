//! Single-instance run lock.
//!
//! One lock file in the cache directory keeps two invocations from
//! synthesizing at the same time. Acquisition uses an atomic exclusive
//! create, so there is no window between checking and claiming. Status notes
//! are appended while the lock is held; on contention the other process's
//! notes are read back and reported.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

const LOCK_FILE_NAME: &str = "read-to-me.lock";

/// Errors acquiring the run lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("another run holds the lock at {}\n{status}", .path.display())]
    Contended { path: PathBuf, status: String },

    #[error("could not create lock file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held run lock; the file is removed when this is dropped.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    file: File,
}

impl RunLock {
    /// Acquire the process-wide lock at its default cache-directory path.
    pub fn acquire() -> Result<Self, LockError> {
        let dir = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
        let _ = fs::create_dir_all(&dir);
        Self::acquire_at(dir.join(LOCK_FILE_NAME))
    }

    /// Acquire a lock at an explicit path.
    pub fn acquire_at(path: PathBuf) -> Result<Self, LockError> {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => Ok(Self { path, file }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let status = fs::read_to_string(&path).unwrap_or_default();
                Err(LockError::Contended { path, status })
            }
            Err(source) => Err(LockError::Io { path, source }),
        }
    }

    /// Append a status note for other invocations to read on contention.
    pub fn note(&mut self, message: &str) {
        let _ = writeln!(self.file, "{message}");
        let _ = self.file.flush();
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.lock");

        let lock = RunLock::acquire_at(path.clone()).unwrap();
        assert!(path.exists());

        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn test_contention_reports_holder_status() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.lock");

        let mut held = RunLock::acquire_at(path.clone()).unwrap();
        held.note("Processing EPUB: /books/a.epub");

        let err = RunLock::acquire_at(path.clone()).unwrap_err();
        match err {
            LockError::Contended { status, .. } => {
                assert!(status.contains("Processing EPUB: /books/a.epub"));
            }
            other => panic!("expected Contended, got {other:?}"),
        }
    }

    #[test]
    fn test_held_lock_is_debug_printable() {
        // unwrap_err() on acquire results needs RunLock: Debug.
        let dir = TempDir::new().unwrap();
        let lock = RunLock::acquire_at(dir.path().join("test.lock")).unwrap();
        let rendered = format!("{lock:?}");
        assert!(rendered.contains("RunLock"));
    }

    #[test]
    fn test_reacquire_after_release() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.lock");

        drop(RunLock::acquire_at(path.clone()).unwrap());
        let second = RunLock::acquire_at(path.clone());
        assert!(second.is_ok());
    }
}
