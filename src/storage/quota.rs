//! Quota enforcement
//!
//! Every mutating request is checked here before it touches storage:
//! name length, per-user byte quota, nesting depth, and sibling count.
//! The database-wide quota is only consulted when an account is created.

use super::operations::count_subdirectories;
use super::sandbox::depth_below;
use super::usage::DiskUsage;
use crate::config::LimitsConfig;
use crate::error::{ServiceResult, ValidationError};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Size a mutation adds to a user's root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddedBytes {
    /// Payload length of a file write
    File(u64),
    /// Nominal cost of an empty directory
    Directory,
}

/// Applies the configured limits
pub struct QuotaEnforcer {
    limits: LimitsConfig,
    usage: Arc<dyn DiskUsage>,
}

impl QuotaEnforcer {
    pub fn new(limits: LimitsConfig, usage: Arc<dyn DiskUsage>) -> Self {
        Self { limits, usage }
    }

    fn added_bytes(&self, added: AddedBytes) -> u64 {
        match added {
            AddedBytes::File(len) => len,
            AddedBytes::Directory => self.limits.directory_cost_bytes,
        }
    }

    /// Reject over-long names and writes that would exceed the user quota.
    pub fn check_name_and_size(
        &self,
        root: &Path,
        added: AddedBytes,
        path: &Path,
    ) -> ServiceResult<()> {
        let name_length = path
            .file_name()
            .map(|name| name.to_string_lossy().chars().count())
            .unwrap_or(0);
        if name_length > self.limits.max_name_length {
            return Err(ValidationError::NameTooLong {
                max: self.limits.max_name_length,
            }
            .into());
        }

        let added = self.added_bytes(added);
        let used = self.usage.usage_bytes(root)?;
        if used.saturating_add(added) > self.limits.user_quota_bytes {
            warn!(
                "Quota rejection under {}: {} used + {} added",
                root.display(),
                used,
                added
            );
            return Err(ValidationError::QuotaExceeded {
                used,
                added,
                quota: self.limits.user_quota_bytes,
            }
            .into());
        }

        Ok(())
    }

    /// Whether `path` sits at most `max_directory_depth` segments below `root`
    pub fn check_nesting(&self, path: &Path, root: &Path) -> bool {
        depth_below(root, path) <= self.limits.max_directory_depth
    }

    /// Whether the parent of `target` has room for one more subdirectory
    pub fn check_sibling_count(&self, target: &Path) -> ServiceResult<bool> {
        let Some(parent) = target.parent() else {
            return Ok(true);
        };
        let siblings = count_subdirectories(parent)?;
        Ok(siblings < self.limits.max_subdirectories)
    }

    /// All directory-creation checks, in order, failing on the first violation
    pub fn check_new_directory(&self, root: &Path, path: &Path) -> ServiceResult<()> {
        self.check_name_and_size(root, AddedBytes::Directory, path)?;

        if !self.check_nesting(path, root) {
            return Err(ValidationError::NestingTooDeep {
                max: self.limits.max_directory_depth,
            }
            .into());
        }

        if !self.check_sibling_count(path)? {
            return Err(ValidationError::TooManySubdirectories {
                max: self.limits.max_subdirectories,
            }
            .into());
        }

        Ok(())
    }

    /// Refuse a new account once every root plus its overhead, plus the new
    /// account's overhead, would pass the database-wide quota.
    pub fn check_aggregate(&self, roots: &[PathBuf]) -> ServiceResult<()> {
        let mut total = self.limits.account_overhead_bytes;
        for root in roots {
            total = total
                .saturating_add(self.usage.usage_bytes(root)?)
                .saturating_add(self.limits.account_overhead_bytes);
        }

        if total > self.limits.total_quota_bytes {
            warn!(
                "Database full: {} bytes across {} accounts",
                total,
                roots.len()
            );
            return Err(ValidationError::DatabaseFull.into());
        }
        Ok(())
    }
}
