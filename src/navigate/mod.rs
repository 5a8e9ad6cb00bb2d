//! Navigate module
//!
//! Tracks each user's working directory and resolves directory changes
//! inside their root.

mod operations;
mod results;
mod tracker;

pub use operations::{change_directory, print_working_directory};
pub use results::CwdResult;
pub use tracker::DirectoryTracker;
