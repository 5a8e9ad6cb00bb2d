//! Server core functionality
//!
//! The TCP accept loop and connection limiting.

pub mod core;

pub use self::core::Server;
