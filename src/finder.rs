//! Top-level duplicate-finder facade
//!
//! Owns the record store for the life of a session and exposes the public
//! operation set: scan, group discovery, keep-one deletion, clearing, and
//! statistics. Groups returned by [`DuplicateFinder::find_duplicate_groups`]
//! are snapshots; re-query after any deletion pass.

use std::path::{Path, PathBuf};

use log::info;

use crate::config::FinderConfig;
use crate::db::Store;
use crate::error::{DedupError, GroupError};
use crate::groups::DuplicateGroup;
use crate::models::{ScanSummary, UnreadableFileRecord};
use crate::scanner;
use crate::stats::{ExtensionStats, Statistics};

/// Duplicate-file discovery and deletion over a persistent index
pub struct DuplicateFinder {
    store: Store,
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Open (or create) the index at `db_path` with default settings
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, DedupError> {
        Self::with_config(FinderConfig::new(db_path.as_ref()))
    }

    /// Open (or create) the index described by `config`
    pub fn with_config(config: FinderConfig) -> Result<Self, DedupError> {
        let store = Store::open(&config.db_path)?;
        Ok(Self { store, config })
    }

    /// Fully in-memory finder (for testing)
    pub fn in_memory() -> Result<Self, DedupError> {
        Ok(Self {
            store: Store::open_in_memory()?,
            config: FinderConfig::default(),
        })
    }

    /// The underlying record store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Scan `root` into the index, recursively or direct children only.
    ///
    /// Unreadable files are audited and skipped; the summary reports both
    /// counts.
    pub fn scan(&self, root: &Path, recursive: bool) -> Result<ScanSummary, DedupError> {
        scanner::scan(&self.store, root, recursive, self.config.algorithm)
    }

    /// All duplicate clusters as immutable groups, ordered by fingerprint.
    ///
    /// Every member of a cluster must report the same size; a mismatch is
    /// surfaced as a data-integrity anomaly rather than silently assuming
    /// one member's size.
    pub fn find_duplicate_groups(&self) -> Result<Vec<DuplicateGroup>, DedupError> {
        let clusters = self.store.find_duplicate_fingerprints()?;

        let mut groups = Vec::with_capacity(clusters.len());
        for cluster in clusters {
            let file_size = cluster.members[0].size;
            if let Some(odd) = cluster.members.iter().find(|m| m.size != file_size) {
                return Err(GroupError::SizeMismatch {
                    fingerprint: cluster.fingerprint,
                    expected: file_size,
                    actual: odd.size,
                }
                .into());
            }

            let paths = cluster
                .members
                .into_iter()
                .map(|m| PathBuf::from(m.path))
                .collect();
            groups.push(DuplicateGroup::new(cluster.fingerprint, file_size, paths)?);
        }
        Ok(groups)
    }

    /// Reduce every duplicate group to one survivor.
    ///
    /// `keep_first` retains the lexicographically smallest path per group,
    /// otherwise the largest. Returns all paths actually removed, or with
    /// `dry_run` all paths that would be removed, without mutating
    /// anything.
    pub fn delete_duplicates(
        &self,
        keep_first: bool,
        dry_run: bool,
    ) -> Result<Vec<PathBuf>, DedupError> {
        let groups = self.find_duplicate_groups()?;

        let mut deleted = Vec::new();
        for group in &groups {
            let keep = if keep_first {
                group.paths().first()
            } else {
                group.paths().last()
            };
            let keep = keep.map(|p| p.as_path());
            deleted.extend(group.delete_duplicates(&self.store, keep, dry_run)?);
        }

        if !dry_run {
            info!("deleted {} duplicate file(s)", deleted.len());
        }
        Ok(deleted)
    }

    /// Remove every file record from the index (audit rows are kept)
    pub fn clear(&self) -> Result<(), DedupError> {
        self.store.clear()?;
        Ok(())
    }

    /// Aggregate statistics over the whole index
    pub fn statistics(&self) -> Result<Statistics, DedupError> {
        Ok(self.store.aggregate_statistics()?)
    }

    /// Per-extension statistics, ordered by descending count
    pub fn statistics_by_extension(&self) -> Result<Vec<ExtensionStats>, DedupError> {
        Ok(self.store.aggregate_by_extension()?)
    }

    /// All indexed paths, sorted ascending
    pub fn scanned_paths(&self) -> Result<Vec<String>, DedupError> {
        Ok(self.store.scanned_paths()?)
    }

    /// The unreadable-file audit trail
    pub fn unreadable_files(&self) -> Result<Vec<UnreadableFileRecord>, DedupError> {
        Ok(self.store.unreadable_files()?)
    }
}
