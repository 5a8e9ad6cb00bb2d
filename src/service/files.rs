//! File operations
//!
//! Each follows the same pipeline: validate the session, resolve the path
//! inside the caller's root, enforce quota and structure limits for
//! mutations, then perform the filesystem effect.

use super::LockerService;
use crate::error::{ServiceResult, ValidationError};
use crate::navigate::{change_directory, print_working_directory};
use crate::storage::operations::{
    create_directory, list_directory, read_file, remove_entry, write_file,
};
use crate::storage::{AddedBytes, DirEntry};
use log::info;

impl LockerService {
    /// Create or overwrite a file
    pub fn upload(&self, token: &str, path: &str, body: &[u8]) -> ServiceResult<()> {
        let caller = self.caller(token)?;
        let target = caller.sandbox.resolve(path);
        let shown = caller.sandbox.display(&target);

        self.quota.check_name_and_size(
            caller.sandbox.root(),
            AddedBytes::File(body.len() as u64),
            &target,
        )?;
        write_file(&target, &shown, body)?;

        info!("{} uploaded {} ({} bytes)", caller.username, shown, body.len());
        Ok(())
    }

    pub fn download(&self, token: &str, path: &str) -> ServiceResult<Vec<u8>> {
        let caller = self.caller(token)?;
        let target = caller.sandbox.resolve(path);
        read_file(&target, &caller.sandbox.display(&target))
    }

    pub fn list(&self, token: &str, path: &str) -> ServiceResult<Vec<DirEntry>> {
        let caller = self.caller(token)?;
        let target = caller.sandbox.resolve(path);
        list_directory(&target, &caller.sandbox.display(&target))
    }

    /// Create a directory after the name, quota, nesting, and sibling checks
    pub fn mkdir(&self, token: &str, path: &str) -> ServiceResult<()> {
        let caller = self.caller(token)?;
        let target = caller.sandbox.resolve(path);
        let shown = caller.sandbox.display(&target);

        self.quota
            .check_new_directory(caller.sandbox.root(), &target)?;
        create_directory(&target, &shown)?;

        info!("{} created {}", caller.username, shown);
        Ok(())
    }

    /// Remove a file or an empty directory; the root itself is refused
    pub fn remove(&self, token: &str, path: &str) -> ServiceResult<()> {
        let caller = self.caller(token)?;
        let target = caller.sandbox.resolve(path);
        if caller.sandbox.is_root(&target) {
            return Err(ValidationError::RootRemoval.into());
        }

        let shown = caller.sandbox.display(&target);
        remove_entry(&target, &shown)?;

        info!("{} removed {}", caller.username, shown);
        Ok(())
    }

    /// Current directory with the root prefix stripped
    pub fn pwd(&self, token: &str) -> ServiceResult<String> {
        let caller = self.caller(token)?;
        Ok(print_working_directory(&caller.sandbox))
    }

    /// Move the caller's working directory; only stored once the target is
    /// known to be an existing directory
    pub fn cd(&self, token: &str, path: &str) -> ServiceResult<()> {
        let caller = self.caller(token)?;
        let result = change_directory(&caller.sandbox, path)?;
        self.directories.set(&caller.username, &result.real_path)?;

        info!("{} changed directory to {}", caller.username, result.virtual_path);
        Ok(())
    }
}
