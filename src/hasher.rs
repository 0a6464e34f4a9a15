//! Content fingerprinting for scanned files
//!
//! Files are read in fixed-size chunks and fed into an incremental digest,
//! so memory stays bounded regardless of file size. Two invocations on
//! unchanged bytes yield identical output; collision resistance of the
//! selected digest is assumed, not verified.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::digest::{Digest, Output};
use sha2::Sha256;

use crate::error::ReadError;

/// Chunk size for streaming reads (64 KiB)
const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithm used for content fingerprints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256, cryptographic strength, 256-bit output (default)
    #[default]
    Sha256,
    /// MD5, faster but weaker, 128-bit output; acceptable for
    /// non-adversarial deduplication
    Md5,
}

impl HashAlgorithm {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Md5 => "md5",
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "md5" => Ok(HashAlgorithm::Md5),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

/// Compute the content fingerprint of `path` as a lowercase hex string.
///
/// Fails with a classified [`ReadError`] if the file cannot be opened or a
/// read fails mid-stream; recovery is the caller's decision.
pub fn fingerprint(path: &Path, algorithm: HashAlgorithm) -> Result<String, ReadError> {
    let result = match algorithm {
        HashAlgorithm::Sha256 => digest_stream::<Sha256>(path),
        HashAlgorithm::Md5 => digest_stream::<Md5>(path),
    };
    result.map_err(|err| ReadError::from_io(path, err))
}

/// Stream the file through an incremental digest in fixed-size chunks
fn digest_stream<D>(path: &Path) -> io::Result<String>
where
    D: Digest,
    Output<D>: std::fmt::LowerHex,
{
    let mut file = File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadErrorKind;
    use proptest::prelude::*;
    use std::fs;

    fn write_temp(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn sha256_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "hello.txt", b"Hello, World!");
        let hash = fingerprint(&path, HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            hash,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );
    }

    #[test]
    fn md5_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "hello.txt", b"Hello, World!");
        let hash = fingerprint(&path, HashAlgorithm::Md5).unwrap();
        assert_eq!(hash, "65a8e27d8879283831b664bd8b7f0ad4");
    }

    #[test]
    fn empty_file_hashes_to_empty_input_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "empty", b"");
        let hash = fingerprint(&path, HashAlgorithm::Sha256).unwrap();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn identical_content_same_fingerprint_across_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_temp(&dir, "a.bin", b"same bytes");
        let b = write_temp(&dir, "b.bin", b"same bytes");
        assert_eq!(
            fingerprint(&a, HashAlgorithm::Sha256).unwrap(),
            fingerprint(&b, HashAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn differing_content_differing_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_temp(&dir, "a.bin", b"content one");
        let b = write_temp(&dir, "b.bin", b"content two");
        assert_ne!(
            fingerprint(&a, HashAlgorithm::Sha256).unwrap(),
            fingerprint(&b, HashAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn chunked_read_spans_chunk_boundary() {
        // Content larger than one 64 KiB chunk must hash the full stream,
        // not just the first buffer fill.
        let dir = tempfile::tempdir().unwrap();
        let big = vec![0xABu8; HASH_CHUNK_SIZE + 4096];
        let mut tail_differs = big.clone();
        *tail_differs.last_mut().unwrap() = 0xCD;

        let a = write_temp(&dir, "big_a", &big);
        let b = write_temp(&dir, "big_b", &tail_differs);
        assert_ne!(
            fingerprint(&a, HashAlgorithm::Sha256).unwrap(),
            fingerprint(&b, HashAlgorithm::Sha256).unwrap()
        );
    }

    #[test]
    fn missing_file_is_classified_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist");
        let err = fingerprint(&path, HashAlgorithm::Sha256).unwrap_err();
        assert_eq!(err.kind, ReadErrorKind::NotFound);
    }

    #[test]
    fn algorithm_round_trips_through_str() {
        assert_eq!("sha256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert_eq!("MD5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn fingerprint_is_deterministic(content in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let dir = tempfile::tempdir().unwrap();
            let path = write_temp(&dir, "blob", &content);
            let first = fingerprint(&path, HashAlgorithm::Sha256).unwrap();
            let second = fingerprint(&path, HashAlgorithm::Sha256).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), 64);
        }
    }
}
