//! Storage operations
//!
//! Plain filesystem effects behind the file handlers: write, read, list,
//! create, and remove. Paths arrive already sandboxed; `shown` is the
//! root-relative form used in error messages so host paths never leak.

use log::{error, info};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::{ServiceError, ServiceResult};
use crate::storage::results::DirEntry;

fn io_failure(err: io::Error, shown: &str) -> ServiceError {
    match err.kind() {
        io::ErrorKind::NotFound => ServiceError::NotFound(shown.to_string()),
        io::ErrorKind::AlreadyExists => ServiceError::Conflict(format!("{shown}: already exists")),
        _ => ServiceError::from(err),
    }
}

/// A dropped `NamedTempFile` deletes itself, so a failed write leaves
/// nothing behind.
fn stage_and_persist(parent: &Path, path: &Path, body: &[u8]) -> io::Result<()> {
    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(body)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create or overwrite a file. The bytes land in an anonymous temporary
/// sibling first and are renamed over `path` only once fully written.
pub fn write_file(path: &Path, shown: &str, body: &[u8]) -> ServiceResult<()> {
    let parent = match path.parent() {
        Some(parent) if parent.is_dir() => parent,
        _ => return Err(ServiceError::NotFound(format!("{shown}: parent directory"))),
    };
    if path.is_dir() {
        return Err(ServiceError::Conflict(format!("{shown}: is a directory")));
    }

    if let Err(e) = stage_and_persist(parent, path, body) {
        error!("Failed to store {} ({}): {}", shown, path.display(), e);
        return Err(io_failure(e, shown));
    }

    info!("Stored {} bytes at {}", body.len(), path.display());
    Ok(())
}

/// Read a whole file
pub fn read_file(path: &Path, shown: &str) -> ServiceResult<Vec<u8>> {
    if path.is_dir() {
        return Err(ServiceError::NotFound(format!("{shown}: not a file")));
    }
    fs::read(path).map_err(|e| io_failure(e, shown))
}

/// Entries of a directory, sorted by name
pub fn list_directory(path: &Path, shown: &str) -> ServiceResult<Vec<DirEntry>> {
    let entries = fs::read_dir(path).map_err(|e| io_failure(e, shown))?;

    let mut listing = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_failure(e, shown))?;
        let file_type = entry.file_type().map_err(|e| io_failure(e, shown))?;
        listing.push(DirEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: file_type.is_dir(),
        });
    }
    listing.sort_by(|a, b| a.name.cmp(&b.name));

    info!("Listed {} ({} entries)", path.display(), listing.len());
    Ok(listing)
}

/// Create a single directory; the parent must already exist
pub fn create_directory(path: &Path, shown: &str) -> ServiceResult<()> {
    fs::create_dir(path).map_err(|e| io_failure(e, shown))?;
    info!("Created directory {}", path.display());
    Ok(())
}

/// Remove a file or an empty directory
pub fn remove_entry(path: &Path, shown: &str) -> ServiceResult<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| io_failure(e, shown))?;
    let removed = if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    };

    removed.map_err(|e| {
        error!("Failed to remove {} ({}): {}", shown, path.display(), e);
        io_failure(e, shown)
    })?;
    info!("Removed {}", path.display());
    Ok(())
}

/// Remove a directory and everything below it
pub fn remove_tree(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Number of directories directly inside `dir`; a missing `dir` has none
pub fn count_subdirectories(dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut count = 0;
    for entry in entries {
        if entry?.file_type()?.is_dir() {
            count += 1;
        }
    }
    Ok(count)
}
