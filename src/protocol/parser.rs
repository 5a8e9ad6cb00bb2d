//! Request parsing
//!
//! Turns one line read from a client into a `Request`.

use crate::protocol::Request;

/// Parse a single JSON request line; trailing whitespace is ignored
pub fn parse_request(line: &str) -> Result<Request, serde_json::Error> {
    serde_json::from_str(line.trim_end())
}
