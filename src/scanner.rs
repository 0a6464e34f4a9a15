//! Directory scanning into the record store
//!
//! Walks a root, fingerprints every regular file, and upserts the result.
//! Per-file read failures are isolated into the unreadable audit table so
//! one bad file never aborts a scan; store failures are fatal.

use std::fs;
use std::path::Path;

use log::{debug, warn};
use walkdir::WalkDir;

use crate::db::Store;
use crate::error::{DedupError, ReadError, ReadErrorKind};
use crate::hasher::{fingerprint, HashAlgorithm};
use crate::models::{FileRecord, ScanSummary};

/// Scan `root`, upserting a record for every readable regular file.
///
/// With `recursive` false only direct children of `root` are candidates.
/// The summary counts successful upserts and recorded read failures;
/// re-scanning an unchanged tree is idempotent.
pub fn scan(
    store: &Store,
    root: &Path,
    recursive: bool,
    algorithm: HashAlgorithm,
) -> Result<ScanSummary, DedupError> {
    let metadata = fs::metadata(root).map_err(|err| ReadError::from_io(root, err))?;
    if !metadata.is_dir() {
        return Err(ReadError::invalid_path(root, "scan root is not a directory").into());
    }

    let mut walker = WalkDir::new(root).follow_links(false);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut summary = ScanSummary::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let kind = err
                    .io_error()
                    .map(ReadErrorKind::classify)
                    .unwrap_or(ReadErrorKind::Io);
                if let Some(path) = err.path() {
                    warn!("cannot traverse {}: {err}", path.display());
                    store.record_unreadable(path, kind)?;
                    summary.unreadable_files += 1;
                } else {
                    warn!("walk error without a path: {err}");
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match scan_file(store, entry.path(), algorithm) {
            Ok(()) => summary.scanned_files += 1,
            Err(DedupError::Read(err)) => {
                warn!("cannot read {}: {err}", entry.path().display());
                store.record_unreadable(entry.path(), err.kind)?;
                summary.unreadable_files += 1;
            }
            // Store failures are fatal, never recovered per-file.
            Err(err) => return Err(err),
        }
    }

    debug!(
        "scan of {} finished: {} indexed, {} unreadable",
        root.display(),
        summary.scanned_files,
        summary.unreadable_files
    );
    Ok(summary)
}

/// Fingerprint one candidate and upsert its record.
///
/// The path is canonicalized first so the same physical file scanned via
/// different relative paths maps to one record.
fn scan_file(store: &Store, path: &Path, algorithm: HashAlgorithm) -> Result<(), DedupError> {
    let canonical = fs::canonicalize(path).map_err(|err| ReadError::from_io(path, err))?;
    let hash = fingerprint(&canonical, algorithm)?;
    let size = fs::metadata(&canonical)
        .map_err(|err| ReadError::from_io(&canonical, err))?
        .len();

    let record = FileRecord::from_scan(&canonical, hash, size);
    store.upsert(&record)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scan_dir(store: &Store, root: &Path, recursive: bool) -> ScanSummary {
        scan(store, root, recursive, HashAlgorithm::Sha256).unwrap()
    }

    #[test]
    fn recursive_scan_includes_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("subdir");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("top.txt"), b"top").unwrap();
        fs::write(sub.join("nested.txt"), b"nested").unwrap();

        let store = Store::open_in_memory().unwrap();
        let summary = scan_dir(&store, dir.path(), true);
        assert_eq!(summary.scanned_files, 2);
        assert_eq!(store.file_count().unwrap(), 2);
    }

    #[test]
    fn non_recursive_scan_only_sees_direct_children() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("subdir");
        fs::create_dir(&sub).unwrap();
        fs::write(dir.path().join("top.txt"), b"top").unwrap();
        fs::write(sub.join("nested.txt"), b"nested").unwrap();

        let store = Store::open_in_memory().unwrap();
        let summary = scan_dir(&store, dir.path(), false);
        assert_eq!(summary.scanned_files, 1);

        let paths = store.scanned_paths().unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("top.txt"));
    }

    #[test]
    fn rescan_is_idempotent_for_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"stable").unwrap();

        let store = Store::open_in_memory().unwrap();
        scan_dir(&store, dir.path(), false);
        let first = store.scanned_paths().unwrap();
        let fingerprint_before = store
            .get_record(Path::new(&first[0]))
            .unwrap()
            .unwrap()
            .fingerprint;

        let summary = scan_dir(&store, dir.path(), false);
        assert_eq!(summary.scanned_files, 1);
        assert_eq!(store.file_count().unwrap(), 1);
        let fingerprint_after = store
            .get_record(Path::new(&first[0]))
            .unwrap()
            .unwrap()
            .fingerprint;
        assert_eq!(fingerprint_before, fingerprint_after);
    }

    #[test]
    fn rescan_overwrites_stale_fingerprint_of_changed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mutable.txt");
        fs::write(&path, b"before").unwrap();

        let store = Store::open_in_memory().unwrap();
        scan_dir(&store, dir.path(), false);
        let canonical = fs::canonicalize(&path).unwrap();
        let before = store.get_record(&canonical).unwrap().unwrap();

        fs::write(&path, b"after, and longer").unwrap();
        scan_dir(&store, dir.path(), false);
        let after = store.get_record(&canonical).unwrap().unwrap();

        assert_ne!(before.fingerprint, after.fingerprint);
        assert_eq!(after.size, 17);
        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn same_file_scanned_via_different_roots_maps_to_one_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"once").unwrap();

        let store = Store::open_in_memory().unwrap();
        scan_dir(&store, dir.path(), true);
        // Second pass over a dot-relative spelling of the same root
        let dotted = dir.path().join(".");
        scan_dir(&store, &dotted, true);

        assert_eq!(store.file_count().unwrap(), 1);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory().unwrap();
        let missing = dir.path().join("nope");
        let err = scan(&store, &missing, true, HashAlgorithm::Sha256).unwrap_err();
        assert!(matches!(err, DedupError::Read(_)));
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"not a dir").unwrap();

        let store = Store::open_in_memory().unwrap();
        let err = scan(&store, &file, true, HashAlgorithm::Sha256).unwrap_err();
        match err {
            DedupError::Read(read) => assert_eq!(read.kind, ReadErrorKind::InvalidPath),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_file_is_audited_and_scan_continues() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("readable.txt"), b"fine").unwrap();
        let blocked = dir.path().join("blocked.txt");
        fs::write(&blocked, b"secret").unwrap();
        fs::set_permissions(&blocked, fs::Permissions::from_mode(0o000)).unwrap();

        // A privileged process reads through 0o000; nothing to simulate then.
        if fs::File::open(&blocked).is_ok() {
            fs::set_permissions(&blocked, fs::Permissions::from_mode(0o644)).unwrap();
            return;
        }

        let store = Store::open_in_memory().unwrap();
        let summary = scan_dir(&store, dir.path(), false);

        assert_eq!(summary.scanned_files, 1);
        assert_eq!(summary.unreadable_files, 1);
        let audit = store.unreadable_files().unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].error_kind, "permission-denied");

        fs::set_permissions(&blocked, fs::Permissions::from_mode(0o644)).unwrap();
    }
}
