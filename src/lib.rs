//! Duplicate file discovery over a persistent fingerprint index
//!
//! This library scans directory trees, fingerprints file content in
//! bounded chunks, and keeps the results in a SQLite index so duplicate
//! clusters can be queried, inspected, and safely reduced to a single
//! surviving copy. Deletion is dry-run by default and recovers from
//! per-file failures; files that cannot be read during a scan land in an
//! append-only audit table instead of aborting the pass.

pub mod config;
pub mod db;
pub mod error;
pub mod finder;
pub mod groups;
pub mod hasher;
pub mod models;
pub mod scanner;
pub mod stats;

pub use config::FinderConfig;
pub use db::Store;
pub use error::{DedupError, GroupError, ReadError, ReadErrorKind, RemovalError, StoreError};
pub use finder::DuplicateFinder;
pub use groups::DuplicateGroup;
pub use hasher::{fingerprint, HashAlgorithm};
pub use models::{FileRecord, ScanSummary, UnreadableFileRecord};
pub use scanner::scan;
pub use stats::{format_size, ExtensionStats, Statistics};
