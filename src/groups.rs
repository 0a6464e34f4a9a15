//! Immutable duplicate-group value and its deletion workflow
//!
//! A [`DuplicateGroup`] is a read-only snapshot of one fingerprint cluster
//! at query time. It is stale the instant the store changes underneath it;
//! callers needing a second deletion pass must re-query.

use std::fs;
use std::ops::Index;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;

use crate::db::Store;
use crate::error::{DedupError, GroupError, RemovalError};

/// One cluster of same-fingerprint paths.
///
/// Fields are private and there are no mutators: the value cannot change
/// after construction. The constructor enforces the ≥2-member invariant.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    fingerprint: String,
    file_size: u64,
    paths: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Build a group from a fingerprint, the shared per-file size, and the
    /// member paths. Paths are sorted ascending; fewer than 2 members is a
    /// contract violation.
    pub fn new(
        fingerprint: impl Into<String>,
        file_size: u64,
        mut paths: Vec<PathBuf>,
    ) -> Result<Self, GroupError> {
        if paths.len() < 2 {
            return Err(GroupError::TooFewMembers { count: paths.len() });
        }
        paths.sort();
        Ok(Self {
            fingerprint: fingerprint.into(),
            file_size,
            paths,
        })
    }

    /// The shared content fingerprint
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Size of each member in bytes (identical across the group)
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Member paths in ascending lexicographic order
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Number of member paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false for a validly constructed group
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate members in the fixed sorted order
    pub fn iter(&self) -> std::slice::Iter<'_, PathBuf> {
        self.paths.iter()
    }

    /// Bytes occupied by the whole cluster
    pub fn total_size(&self) -> u64 {
        self.file_size * self.paths.len() as u64
    }

    /// Bytes reclaimable by reducing the cluster to one survivor
    pub fn wasted_space(&self) -> u64 {
        self.file_size * (self.paths.len() as u64 - 1)
    }

    /// Delete every member except `keep_path`, which must be a member of
    /// the group; `None` makes the whole group a deletion candidate.
    ///
    /// With `dry_run`, returns the candidates without touching the
    /// filesystem or the store. Otherwise each candidate that still exists
    /// is removed from disk and from the store and included in the result;
    /// vanished or unremovable candidates are skipped and excluded.
    pub fn delete_duplicates(
        &self,
        store: &Store,
        keep_path: Option<&Path>,
        dry_run: bool,
    ) -> Result<Vec<PathBuf>, DedupError> {
        if let Some(keep) = keep_path {
            if !self.paths.iter().any(|p| p == keep) {
                return Err(GroupError::KeepPathNotMember {
                    path: keep.to_path_buf(),
                }
                .into());
            }
        }

        let candidates: Vec<PathBuf> = self
            .paths
            .iter()
            .filter(|p| keep_path != Some(p.as_path()))
            .cloned()
            .collect();

        self.delete_candidates(store, candidates, dry_run)
    }

    /// Same semantics as [`Self::delete_duplicates`], selecting the
    /// survivor by its position in the sorted member order.
    pub fn delete_duplicates_by_index(
        &self,
        store: &Store,
        keep_index: usize,
        dry_run: bool,
    ) -> Result<Vec<PathBuf>, DedupError> {
        let keep = self
            .paths
            .get(keep_index)
            .cloned()
            .ok_or(GroupError::KeepIndexOutOfRange {
                index: keep_index,
                len: self.paths.len(),
            })?;
        self.delete_duplicates(store, Some(keep.as_path()), dry_run)
    }

    fn delete_candidates(
        &self,
        store: &Store,
        candidates: Vec<PathBuf>,
        dry_run: bool,
    ) -> Result<Vec<PathBuf>, DedupError> {
        if dry_run {
            return Ok(candidates);
        }

        let mut removed = Vec::new();
        for path in candidates {
            match remove_from_disk(&path) {
                Ok(()) => {
                    store.delete_record(&path)?;
                    removed.push(path);
                }
                // Skipped candidates stay out of the result; the file (and
                // its record, if any) are left as-is.
                Err(err) => warn!("skipping deletion candidate: {err}"),
            }
        }
        Ok(removed)
    }
}

/// Remove one candidate, reporting a vanished file or a failed removal as
/// an explicit error value for the caller's accounting.
fn remove_from_disk(path: &Path) -> Result<(), RemovalError> {
    if !path.exists() {
        return Err(RemovalError::vanished(path));
    }
    fs::remove_file(path).map_err(|err| RemovalError::from_io(path, err))
}

impl Index<usize> for DuplicateGroup {
    type Output = PathBuf;

    fn index(&self, index: usize) -> &Self::Output {
        &self.paths[index]
    }
}

impl<'a> IntoIterator for &'a DuplicateGroup {
    type Item = &'a PathBuf;
    type IntoIter = std::slice::Iter<'a, PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
