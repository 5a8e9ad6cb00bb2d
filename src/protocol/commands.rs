//! Request messages
//!
//! One JSON object per request line, tagged by `method`. Tokens default to
//! empty so a missing token is reported as an authentication failure rather
//! than a malformed request.

use serde::{Deserialize, Serialize};

/// A client request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    Authenticate {
        #[serde(default)]
        token: String,
    },
    Signup {
        username: String,
        password: String,
    },
    Login {
        username: String,
        password: String,
    },
    Logout {
        #[serde(default)]
        token: String,
    },
    Delete {
        #[serde(default)]
        token: String,
    },
    Upload {
        #[serde(default)]
        token: String,
        path: String,
        #[serde(with = "crate::protocol::translators")]
        body: Vec<u8>,
    },
    Download {
        #[serde(default)]
        token: String,
        path: String,
    },
    List {
        #[serde(default)]
        token: String,
        #[serde(default)]
        path: String,
    },
    Mkdir {
        #[serde(default)]
        token: String,
        path: String,
    },
    Remove {
        #[serde(default)]
        token: String,
        path: String,
    },
    Pwd {
        #[serde(default)]
        token: String,
    },
    Cd {
        #[serde(default)]
        token: String,
        path: String,
    },
}

impl Request {
    /// Wire name of the method, used in logs
    pub fn method(&self) -> &'static str {
        match self {
            Request::Authenticate { .. } => "authenticate",
            Request::Signup { .. } => "signup",
            Request::Login { .. } => "login",
            Request::Logout { .. } => "logout",
            Request::Delete { .. } => "delete",
            Request::Upload { .. } => "upload",
            Request::Download { .. } => "download",
            Request::List { .. } => "list",
            Request::Mkdir { .. } => "mkdir",
            Request::Remove { .. } => "remove",
            Request::Pwd { .. } => "pwd",
            Request::Cd { .. } => "cd",
        }
    }
}
