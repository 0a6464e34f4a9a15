//! Error types for the duplicate finder

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Classification of a failed file read, stored in the unreadable-files audit table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadErrorKind {
    /// Permission denied when opening or reading a file
    PermissionDenied,
    /// File disappeared between listing and reading
    NotFound,
    /// Path exists but cannot be used as a scan candidate
    InvalidPath,
    /// Any other I/O failure
    Io,
}

impl ReadErrorKind {
    /// Classification string persisted in the audit table
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadErrorKind::PermissionDenied => "permission-denied",
            ReadErrorKind::NotFound => "not-found",
            ReadErrorKind::InvalidPath => "invalid-path",
            ReadErrorKind::Io => "io-error",
        }
    }

    /// Classify an I/O error into an audit kind
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => ReadErrorKind::PermissionDenied,
            io::ErrorKind::NotFound => ReadErrorKind::NotFound,
            _ => ReadErrorKind::Io,
        }
    }
}

impl std::fmt::Display for ReadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file could not be opened or read during fingerprinting or metadata lookup.
///
/// Recovered by the scanner: logged to the audit table, scan continues.
#[derive(Debug, Error)]
#[error("{kind}: {message} (path: {path:?})")]
pub struct ReadError {
    /// The kind of read failure
    pub kind: ReadErrorKind,
    /// The path that failed
    pub path: PathBuf,
    /// Human-readable error message
    pub message: String,
}

impl ReadError {
    /// Create a new read error
    pub fn new(kind: ReadErrorKind, path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify and wrap an I/O error for `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        Self::new(ReadErrorKind::classify(&err), path, err.to_string())
    }

    /// The path is not usable as a scan target
    pub fn invalid_path(path: &Path, message: impl Into<String>) -> Self {
        Self::new(ReadErrorKind::InvalidPath, path, message)
    }
}

/// A deletion candidate could not be removed from the filesystem.
///
/// Recovered by group deletion: the candidate is excluded from the
/// reported result, never fatal to the batch.
#[derive(Debug, Error)]
#[error("cannot remove {path:?}: {message}")]
pub struct RemovalError {
    /// The candidate that could not be removed
    pub path: PathBuf,
    /// Human-readable error message
    pub message: String,
}

impl RemovalError {
    /// The candidate no longer exists on the filesystem
    pub fn vanished(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            message: "file no longer exists".to_string(),
        }
    }

    /// Removal failed with an I/O error
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// The persistent store is unavailable or a statement failed.
///
/// Fatal: surfaced to the caller, never retried internally.
#[derive(Debug, Error)]
#[error("store error: {0}")]
pub struct StoreError(#[from] pub rusqlite::Error);

/// A programming-contract violation while building or using a duplicate group
#[derive(Debug, Error)]
pub enum GroupError {
    /// Attempted to construct a group from fewer than 2 paths
    #[error("a duplicate group requires at least 2 members, got {count}")]
    TooFewMembers { count: usize },

    /// The requested survivor is not a member of the group
    #[error("keep path {path:?} is not a member of the group")]
    KeepPathNotMember { path: PathBuf },

    /// The requested survivor index is past the end of the member list
    #[error("keep index {index} out of range for a group of {len} members")]
    KeepIndexOutOfRange { index: usize, len: usize },

    /// Members of one fingerprint cluster report differing sizes
    #[error("members of fingerprint {fingerprint} report differing sizes ({expected} vs {actual} bytes)")]
    SizeMismatch {
        fingerprint: String,
        expected: u64,
        actual: u64,
    },
}

/// Top-level error type for duplicate-finder operations
#[derive(Debug, Error)]
pub enum DedupError {
    /// A file could not be read
    #[error(transparent)]
    Read(#[from] ReadError),

    /// The persistent store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A duplicate-group contract was violated
    #[error(transparent)]
    Group(#[from] GroupError),
}
