//! Sandboxed file storage
//!
//! Path resolution, quota enforcement, disk usage, and the filesystem
//! operations the file handlers compose.

pub mod operations;
pub mod quota;
pub mod results;
pub mod sandbox;
pub mod usage;

pub use quota::{AddedBytes, QuotaEnforcer};
pub use results::DirEntry;
pub use sandbox::PathSandbox;
pub use usage::{DiskUsage, DuUsage, WalkUsage};
