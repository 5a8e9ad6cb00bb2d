//! Disk usage queries
//!
//! `usage_bytes` is a blocking call with no caching. Callers must not hold
//! a record-store lock while it runs.

use crate::config::DiskUsageMode;
use crate::error::StorageError;
use log::debug;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use walkdir::WalkDir;

/// Bytes consumed under a directory subtree
pub trait DiskUsage: Send + Sync {
    fn usage_bytes(&self, root: &Path) -> Result<u64, StorageError>;
}

/// Sums regular file sizes with an in-process walk
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkUsage;

impl DiskUsage for WalkUsage {
    fn usage_bytes(&self, root: &Path) -> Result<u64, StorageError> {
        if !root.exists() {
            return Ok(0);
        }

        let mut total = 0u64;
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| StorageError::DiskUsage(e.to_string()))?;
            if entry.file_type().is_file() {
                let metadata = entry
                    .metadata()
                    .map_err(|e| StorageError::DiskUsage(e.to_string()))?;
                total += metadata.len();
            }
        }

        debug!("Usage of {}: {} bytes", root.display(), total);
        Ok(total)
    }
}

/// Runs `du -sk` and scales the kilobyte count by 1000
#[derive(Debug, Default, Clone, Copy)]
pub struct DuUsage;

impl DiskUsage for DuUsage {
    fn usage_bytes(&self, root: &Path) -> Result<u64, StorageError> {
        let output = Command::new("du").arg("-sk").arg(root).output()?;
        if !output.status.success() {
            return Err(StorageError::DiskUsage(format!(
                "du exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_du_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Bytes from `du -sk` output: the leading kilobyte count scaled by 1000
pub fn parse_du_output(stdout: &str) -> Result<u64, StorageError> {
    let kilobytes: u64 = stdout
        .split_whitespace()
        .next()
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| StorageError::DiskUsage(format!("unexpected du output: {stdout:?}")))?;

    kilobytes
        .checked_mul(1000)
        .ok_or_else(|| StorageError::DiskUsage(format!("du reported {kilobytes} KiB")))
}

/// Build the usage strategy selected in the configuration
pub fn from_mode(mode: DiskUsageMode) -> Arc<dyn DiskUsage> {
    match mode {
        DiskUsageMode::Walk => Arc::new(WalkUsage),
        DiskUsageMode::Du => Arc::new(DuUsage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn walk_sums_nested_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a"), vec![0u8; 100]).unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/b"), vec![0u8; 23]).unwrap();

        assert_eq!(WalkUsage.usage_bytes(tmp.path()).unwrap(), 123);
    }

    #[test]
    fn du_output_scales_kilobytes() {
        assert_eq!(parse_du_output("12\t/srv/store/r1\n").unwrap(), 12_000);
        assert_eq!(parse_du_output("0\t/empty\n").unwrap(), 0);
    }

    #[test]
    fn du_output_garbage_is_an_error() {
        for garbage in ["", "\n", "du: cannot access '/x'", "-3\t/x", "12k\t/x"] {
            assert!(
                matches!(parse_du_output(garbage), Err(StorageError::DiskUsage(_))),
                "{garbage:?} should not parse"
            );
        }
    }

    #[test]
    fn du_measures_a_real_tree() {
        if Command::new("du").arg("-sk").arg(".").output().is_err() {
            eprintln!("du not available, skipping");
            return;
        }
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a"), vec![1u8; 64 * 1024]).unwrap();

        let bytes = DuUsage.usage_bytes(tmp.path()).unwrap();
        assert_eq!(bytes % 1000, 0);
        assert!(bytes >= 64_000, "got {bytes}");
        assert!(matches!(
            DuUsage.usage_bytes(&tmp.path().join("gone")),
            Err(StorageError::DiskUsage(_))
        ));
    }

    #[test]
    fn walk_of_missing_root_is_zero() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(WalkUsage.usage_bytes(&tmp.path().join("gone")).unwrap(), 0);
    }
}
