//! Result types for navigate operations

use std::path::PathBuf;

/// Result of a directory change
#[derive(Debug, Clone)]
pub struct CwdResult {
    /// Root-relative path shown to the client
    pub virtual_path: String,
    pub real_path: PathBuf,
}
