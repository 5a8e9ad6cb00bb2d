//! Response messages
//!
//! Every request gets exactly one response line:
//! `{"status":"ok","result":…}` or
//! `{"status":"error","result":{"kind":…,"message":…}}`.

use crate::error::{ErrorKind, ServiceError, error_kind};
use crate::storage::DirEntry;
use serde::{Deserialize, Serialize};

/// Success payload of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reply {
    Empty,
    Username(String),
    Token(String),
    Body(#[serde(with = "crate::protocol::translators")] Vec<u8>),
    Entries(Vec<DirEntry>),
    Path(String),
}

/// Tagged failure sent back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Response {
    Ok(Reply),
    Error(Failure),
}

impl Response {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Response::Error(Failure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }
}

impl From<&ServiceError> for Response {
    fn from(err: &ServiceError) -> Self {
        Response::failure(error_kind(err), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    #[test]
    fn ok_replies_carry_payload() {
        let json = serde_json::to_string(&Response::Ok(Reply::Path("/docs".into()))).unwrap();
        assert_eq!(json, r#"{"status":"ok","result":{"path":"/docs"}}"#);

        let json = serde_json::to_string(&Response::Ok(Reply::Body(b"hi".to_vec()))).unwrap();
        assert_eq!(json, r#"{"status":"ok","result":{"body":"aGk="}}"#);
    }

    #[test]
    fn errors_carry_kind_and_message() {
        let response = Response::from(&ServiceError::from(AuthError::Expired));
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"status":"error","result":{"kind":"session_expired","message":"authentication failed: session expired"}}"#
        );
        assert_eq!(serde_json::from_str::<Response>(&json).unwrap(), response);
    }
}
