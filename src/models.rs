//! Core data models for the duplicate finder

use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One indexed file, keyed by its canonical absolute path.
///
/// Re-scanning a path replaces its record, so the store always reflects
/// the most recent scan, not history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Canonical absolute path (unique key)
    pub path: String,
    /// Filename without the final extension
    pub stem: String,
    /// Lowercased extension including the leading dot, empty if none
    pub extension: String,
    /// Content fingerprint as lowercase hex
    pub fingerprint: String,
    /// File size in bytes
    pub size: u64,
    /// Scan timestamp as Unix seconds
    pub scanned_at: i64,
}

impl FileRecord {
    /// Build a record for a freshly scanned file, deriving the stem and
    /// lowercased extension from the path and stamping the scan time.
    pub fn from_scan(path: &Path, fingerprint: String, size: u64) -> Self {
        Self {
            path: path.to_string_lossy().into_owned(),
            stem: file_stem(path),
            extension: dotted_extension(path),
            fingerprint,
            size,
            scanned_at: Utc::now().timestamp(),
        }
    }
}

/// Filename without its final extension
fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Lowercased extension with the leading dot, or the empty string
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// One failed read attempt, kept as an append-only audit row.
///
/// Never deduplicated: repeated scans of the same unreadable path
/// produce repeated entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadableFileRecord {
    /// Autogenerated row id
    pub id: i64,
    /// Path that failed to read
    pub path: String,
    /// Error classification (see [`crate::error::ReadErrorKind`])
    pub error_kind: String,
    /// Scan timestamp as Unix seconds
    pub scanned_at: i64,
}

/// Outcome of one scan pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Files successfully fingerprinted and upserted
    pub scanned_files: u64,
    /// Files recorded in the unreadable audit table
    pub unreadable_files: u64,
}

impl ScanSummary {
    /// Fold another summary into this one (multi-root scans)
    pub fn merge(&mut self, other: ScanSummary) {
        self.scanned_files += other.scanned_files;
        self.unreadable_files += other.unreadable_files;
    }
}
