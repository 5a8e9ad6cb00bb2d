//! Error handlers
//!
//! Logs handler failures and maps them onto the kinds reported to clients.

use crate::error::types::{AuthError, ServiceError};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

/// Wire-level classification of a failed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Authentication,
    SessionExpired,
    Authorization,
    Validation,
    NotFound,
    Conflict,
    Storage,
    BadRequest,
    /// Server refused the connection, e.g. at the client limit
    Unavailable,
}

impl ErrorKind {
    /// Whether the client must log in again before retrying
    pub fn is_terminal(&self) -> bool {
        matches!(self, ErrorKind::Authentication | ErrorKind::SessionExpired)
    }
}

/// Log a handler error at a level matching its severity
pub fn handle_error(method: &str, err: &ServiceError) {
    match err {
        ServiceError::Storage(_) => error!("{} failed: {}", method, err),
        ServiceError::Validation(_) | ServiceError::Authorization(_) => {
            warn!("{} rejected: {}", method, err)
        }
        _ => info!("{} refused: {}", method, err),
    }
}

/// Convert an error to the kind sent back to the client
pub fn error_kind(err: &ServiceError) -> ErrorKind {
    match err {
        ServiceError::Authentication(AuthError::Expired) => ErrorKind::SessionExpired,
        ServiceError::Authentication(_) => ErrorKind::Authentication,
        ServiceError::Authorization(_) => ErrorKind::Authorization,
        ServiceError::Validation(_) => ErrorKind::Validation,
        ServiceError::NotFound(_) => ErrorKind::NotFound,
        ServiceError::Conflict(_) => ErrorKind::Conflict,
        ServiceError::Storage(_) => ErrorKind::Storage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::ValidationError;

    #[test]
    fn expired_sessions_have_their_own_kind() {
        let err = ServiceError::from(AuthError::Expired);
        assert_eq!(error_kind(&err), ErrorKind::SessionExpired);
        assert!(error_kind(&err).is_terminal());

        let err = ServiceError::from(AuthError::InvalidToken);
        assert_eq!(error_kind(&err), ErrorKind::Authentication);
    }

    #[test]
    fn validation_failures_keep_the_session() {
        let err = ServiceError::from(ValidationError::NameTooLong { max: 25 });
        assert_eq!(error_kind(&err), ErrorKind::Validation);
        assert!(!error_kind(&err).is_terminal());
    }

    #[test]
    fn kinds_serialize_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::SessionExpired).unwrap();
        assert_eq!(json, "\"session_expired\"");
    }
}
