//! Statistics value types and size formatting

use serde::{Deserialize, Serialize};

/// Aggregate counts and byte totals over the whole record store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of indexed files
    pub total_files: u64,
    /// Distinct fingerprints shared by at least two files
    pub duplicate_groups: u64,
    /// Files belonging to any duplicate fingerprint
    pub duplicate_files: u64,
    /// Files whose fingerprint is unshared (`total - duplicate`)
    pub unique_files: u64,
    /// Sum of sizes across all indexed files
    pub total_size_bytes: u64,
}

/// Counts and byte totals for one file extension.
///
/// Files without an extension are reported under the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionStats {
    /// Lowercased extension with the leading dot, or empty
    pub extension: String,
    /// Number of indexed files with this extension
    pub count: u64,
    /// Sum of their sizes
    pub total_size_bytes: u64,
}

/// Format a byte count as a human-readable string with two decimals,
/// stepping through 1024-based units.
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if size < 1024.0 {
            return format!("{size:.2} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.2} PB")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn format_size_boundaries() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn format_size_saturates_at_petabytes() {
        let one_pb = 1024u64.pow(5);
        assert_eq!(format_size(one_pb), "1.00 PB");
        assert_eq!(format_size(u64::MAX), "16384.00 PB");
    }

    proptest! {
        #[test]
        fn format_size_always_carries_a_unit(bytes in any::<u64>()) {
            let rendered = format_size(bytes);
            prop_assert!(
                ["B", "KB", "MB", "GB", "TB", "PB"]
                    .iter()
                    .any(|unit| rendered.ends_with(unit))
            );
        }
    }
}
