//! Per-user working directory tracking
//!
//! The current directory of each user lives in the record store as an
//! absolute host path. Nothing here touches the process-wide working
//! directory, so concurrent requests from different users never interfere.

use crate::error::{ServiceError, ServiceResult};
use crate::store::{RecordStore, WorkingDirectoryRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Looks up account roots and reads/writes working directories
pub struct DirectoryTracker {
    store: Arc<dyn RecordStore>,
    storage_root: PathBuf,
}

impl DirectoryTracker {
    pub fn new(store: Arc<dyn RecordStore>, storage_root: PathBuf) -> Self {
        Self {
            store,
            storage_root,
        }
    }

    /// Directory holding every account root
    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Host path of a root identifier
    pub fn root_path(&self, root_id: &str) -> PathBuf {
        self.storage_root.join(root_id)
    }

    /// Host path of a user's root directory
    pub fn root_for(&self, username: &str) -> ServiceResult<PathBuf> {
        match self.store.get_account(username)? {
            Some(account) => Ok(self.root_path(&account.root_id)),
            None => Err(ServiceError::NotFound(format!(
                "could not find root for {username}"
            ))),
        }
    }

    /// Stored working directory, or `root` if none is stored or the stored
    /// value lies outside `root`
    pub fn current(&self, username: &str, root: &Path) -> ServiceResult<PathBuf> {
        let stored = self
            .store
            .get_working_directory(username)?
            .map(|record| PathBuf::from(record.path))
            .filter(|path| path.starts_with(root));
        Ok(stored.unwrap_or_else(|| root.to_path_buf()))
    }

    /// Single atomic upsert of the user's working directory
    pub fn set(&self, username: &str, path: &Path) -> ServiceResult<()> {
        self.store.put_working_directory(&WorkingDirectoryRecord {
            username: username.to_string(),
            path: path.to_string_lossy().into_owned(),
        })?;
        Ok(())
    }

    /// Move the user back to their root
    pub fn reset(&self, username: &str) -> ServiceResult<PathBuf> {
        let root = self.root_for(username)?;
        self.set(username, &root)?;
        Ok(root)
    }

    pub fn forget(&self, username: &str) -> ServiceResult<()> {
        self.store.delete_working_directory(username)?;
        Ok(())
    }
}
