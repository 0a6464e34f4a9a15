//! Persistent record store backed by SQLite
//!
//! One `files` row per canonical path (upsert-by-path), plus an
//! append-only `unreadable_files` audit table. The grouping query in
//! [`Store::find_duplicate_fingerprints`] is the single place that
//! defines "duplicate" for the whole system: fingerprint equality,
//! nothing else.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ReadErrorKind, StoreError};
use crate::models::{FileRecord, UnreadableFileRecord};
use crate::stats::{ExtensionStats, Statistics};

/// All members of one fingerprint shared by at least two paths,
/// as returned by the grouping query. Paths arrive sorted ascending.
#[derive(Debug, Clone)]
pub struct FingerprintCluster {
    /// The shared content fingerprint
    pub fingerprint: String,
    /// Member paths with their recorded sizes, sorted by path
    pub members: Vec<ClusterMember>,
}

/// One member row of a fingerprint cluster
#[derive(Debug, Clone)]
pub struct ClusterMember {
    /// Canonical path
    pub path: String,
    /// Recorded size in bytes
    pub size: u64,
}

/// Persistent store of scanned-file records.
///
/// The connection is held for the life of the store (one logical session),
/// not opened per call.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create the store at `path`
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS files (
                path TEXT PRIMARY KEY,
                stem TEXT NOT NULL,
                extension TEXT NOT NULL,
                fingerprint TEXT NOT NULL,
                size INTEGER NOT NULL,
                scanned_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_files_fingerprint ON files(fingerprint);

            CREATE TABLE IF NOT EXISTS unreadable_files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                path TEXT NOT NULL,
                error_kind TEXT NOT NULL,
                scanned_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Insert or replace the record for `record.path`.
    ///
    /// A single statement, so readers of the grouping query never observe
    /// a half-written record.
    pub fn upsert(&self, record: &FileRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO files (path, stem, extension, fingerprint, size, scanned_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.path,
                record.stem,
                record.extension,
                record.fingerprint,
                record.size as i64,
                record.scanned_at,
            ],
        )?;
        Ok(())
    }

    /// Append an audit row for a file that could not be read.
    ///
    /// Prior entries for the same path are never overwritten.
    pub fn record_unreadable(&self, path: &Path, kind: ReadErrorKind) -> Result<(), StoreError> {
        let path_str = path.to_string_lossy();
        self.conn.execute(
            "INSERT INTO unreadable_files (path, error_kind, scanned_at) VALUES (?1, ?2, ?3)",
            params![&*path_str, kind.as_str(), Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Every fingerprint shared by at least two paths, each cluster's
    /// members sorted ascending by path, clusters ordered by fingerprint.
    pub fn find_duplicate_fingerprints(&self) -> Result<Vec<FingerprintCluster>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT fingerprint, path, size
             FROM files
             WHERE fingerprint IN (
                 SELECT fingerprint
                 FROM files
                 GROUP BY fingerprint
                 HAVING COUNT(*) > 1
             )
             ORDER BY fingerprint, path",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)? as u64,
            ))
        })?;

        let mut clusters: Vec<FingerprintCluster> = Vec::new();
        for row in rows {
            let (fingerprint, path, size) = row?;
            let member = ClusterMember { path, size };
            let start_new = clusters
                .last()
                .map_or(true, |cluster| cluster.fingerprint != fingerprint);
            if start_new {
                clusters.push(FingerprintCluster {
                    fingerprint,
                    members: vec![member],
                });
            } else if let Some(cluster) = clusters.last_mut() {
                cluster.members.push(member);
            }
        }
        Ok(clusters)
    }

    /// Remove the record for `path`. Removing an absent path is not an error.
    pub fn delete_record(&self, path: &Path) -> Result<(), StoreError> {
        let path_str = path.to_string_lossy();
        self.conn
            .execute("DELETE FROM files WHERE path = ?1", params![&*path_str])?;
        Ok(())
    }

    /// Remove all file records. The unreadable audit table is untouched.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM files", [])?;
        Ok(())
    }

    /// Number of file records
    pub fn file_count(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Look up a single record by canonical path
    pub fn get_record(&self, path: &Path) -> Result<Option<FileRecord>, StoreError> {
        let path_str = path.to_string_lossy();
        let record = self
            .conn
            .query_row(
                "SELECT path, stem, extension, fingerprint, size, scanned_at
                 FROM files WHERE path = ?1",
                params![&*path_str],
                |row| {
                    Ok(FileRecord {
                        path: row.get(0)?,
                        stem: row.get(1)?,
                        extension: row.get(2)?,
                        fingerprint: row.get(3)?,
                        size: row.get::<_, i64>(4)? as u64,
                        scanned_at: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// All indexed paths, sorted ascending
    pub fn scanned_paths(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path FROM files ORDER BY path")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut paths = Vec::new();
        for row in rows {
            paths.push(row?);
        }
        Ok(paths)
    }

    /// All audit rows, oldest first
    pub fn unreadable_files(&self) -> Result<Vec<UnreadableFileRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path, error_kind, scanned_at FROM unreadable_files ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(UnreadableFileRecord {
                id: row.get(0)?,
                path: row.get(1)?,
                error_kind: row.get(2)?,
                scanned_at: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Number of audit rows
    pub fn unreadable_count(&self) -> Result<u64, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM unreadable_files", [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    /// Aggregate counts and byte totals over all file records
    pub fn aggregate_statistics(&self) -> Result<Statistics, StoreError> {
        let total_files: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;

        let duplicate_groups: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM (
                 SELECT fingerprint
                 FROM files
                 GROUP BY fingerprint
                 HAVING COUNT(*) > 1
             )",
            [],
            |row| row.get(0),
        )?;

        let duplicate_files: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM files
             WHERE fingerprint IN (
                 SELECT fingerprint
                 FROM files
                 GROUP BY fingerprint
                 HAVING COUNT(*) > 1
             )",
            [],
            |row| row.get(0),
        )?;

        let total_size: i64 = self
            .conn
            .query_row("SELECT COALESCE(SUM(size), 0) FROM files", [], |row| {
                row.get(0)
            })?;

        Ok(Statistics {
            total_files: total_files as u64,
            duplicate_groups: duplicate_groups as u64,
            duplicate_files: duplicate_files as u64,
            unique_files: (total_files - duplicate_files) as u64,
            total_size_bytes: total_size as u64,
        })
    }

    /// Per-extension counts and byte totals, ordered by descending count.
    ///
    /// Files with no extension appear under the empty-string key.
    pub fn aggregate_by_extension(&self) -> Result<Vec<ExtensionStats>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT extension, COUNT(*), COALESCE(SUM(size), 0)
             FROM files
             GROUP BY extension
             ORDER BY COUNT(*) DESC, extension ASC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ExtensionStats {
                extension: row.get(0)?,
                count: row.get::<_, i64>(1)? as u64,
                total_size_bytes: row.get::<_, i64>(2)? as u64,
            })
        })?;

        let mut stats = Vec::new();
        for row in rows {
            stats.push(row?);
        }
        Ok(stats)
    }
}
