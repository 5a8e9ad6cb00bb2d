//! Locker wire protocol
//!
//! Newline-delimited JSON requests and responses, and the dispatch from
//! one to the other.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;
pub mod translators;

pub use commands::Request;
pub use handlers::dispatch;
pub use parser::parse_request;
pub use responses::{Failure, Reply, Response};
