//! Configuration for the duplicate finder

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::hasher::HashAlgorithm;

/// Default SQLite index location
pub const DEFAULT_DB_PATH: &str = "deduper.db";

/// Configuration for a [`crate::finder::DuplicateFinder`] session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinderConfig {
    /// Path of the SQLite index file
    pub db_path: PathBuf,

    /// Digest algorithm used for content fingerprints
    pub algorithm: HashAlgorithm,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            algorithm: HashAlgorithm::default(),
        }
    }
}

impl FinderConfig {
    /// Create a config with the given index path
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }

    /// Create a config builder
    pub fn builder() -> FinderConfigBuilder {
        FinderConfigBuilder::new()
    }
}

/// Builder for [`FinderConfig`]
#[derive(Debug, Default)]
pub struct FinderConfigBuilder {
    config: FinderConfig,
}

impl FinderConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the index path
    pub fn db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.db_path = path.into();
        self
    }

    /// Set the fingerprint algorithm
    pub fn algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Build the config
    pub fn build(self) -> FinderConfig {
        self.config
    }
}
