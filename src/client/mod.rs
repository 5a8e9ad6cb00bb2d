//! Client connection handling
//!
//! Reads requests from one connection and writes back their responses.

pub mod handler;

pub use handler::{handle_client, write_response};
