//! Error handling
//!
//! Defines the error taxonomy returned by every request handler and its
//! mapping onto wire-level error kinds.

pub mod handlers;
pub mod types;

pub use handlers::{ErrorKind, error_kind, handle_error};
pub use types::*;
