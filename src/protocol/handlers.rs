//! Request handlers for the locker server.
//!
//! Routes each parsed request to the matching `LockerService` operation and
//! wraps the outcome in a response. Failures are logged here, once, at a
//! level matching their severity.

use crate::error::handle_error;
use crate::protocol::{Reply, Request, Response};
use crate::service::LockerService;

/// Dispatches a request to its operation.
///
/// # Arguments
///
/// * `service` - The service shared by every connection.
/// * `request` - The parsed request.
///
/// # Returns
///
/// * `Response` - `Ok` with the operation's payload, or the tagged failure.
pub fn dispatch(service: &LockerService, request: Request) -> Response {
    let method = request.method();

    let outcome = match request {
        Request::Authenticate { token } => service.authenticate(&token).map(Reply::Username),
        Request::Signup { username, password } => {
            service.signup(&username, &password).map(|_| Reply::Empty)
        }
        Request::Login { username, password } => {
            service.login(&username, &password).map(Reply::Token)
        }
        Request::Logout { token } => service.logout(&token).map(|_| Reply::Empty),
        Request::Delete { token } => service.delete_account(&token).map(|_| Reply::Empty),
        Request::Upload { token, path, body } => {
            service.upload(&token, &path, &body).map(|_| Reply::Empty)
        }
        Request::Download { token, path } => service.download(&token, &path).map(Reply::Body),
        Request::List { token, path } => service.list(&token, &path).map(Reply::Entries),
        Request::Mkdir { token, path } => service.mkdir(&token, &path).map(|_| Reply::Empty),
        Request::Remove { token, path } => service.remove(&token, &path).map(|_| Reply::Empty),
        Request::Pwd { token } => service.pwd(&token).map(Reply::Path),
        Request::Cd { token, path } => service.cd(&token, &path).map(|_| Reply::Empty),
    };

    match outcome {
        Ok(reply) => Response::Ok(reply),
        Err(err) => {
            handle_error(method, &err);
            Response::from(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::error::ErrorKind;
    use crate::protocol::Failure;
    use crate::storage::DirEntry;
    use tempfile::TempDir;

    fn service() -> (TempDir, LockerService) {
        let tmp = TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.startup.storage_root = tmp.path().to_string_lossy().into_owned();
        config.startup.database_path = ":memory:".into();
        let service = LockerService::from_config(&config).unwrap();
        (tmp, service)
    }

    fn login(service: &LockerService) -> String {
        let signup = Request::Signup {
            username: "alice".into(),
            password: "Passw0rd".into(),
        };
        assert_eq!(dispatch(service, signup), Response::Ok(Reply::Empty));

        let login = Request::Login {
            username: "alice".into(),
            password: "Passw0rd".into(),
        };
        match dispatch(service, login) {
            Response::Ok(Reply::Token(token)) => token,
            other => panic!("login failed: {other:?}"),
        }
    }

    fn kind(response: Response) -> ErrorKind {
        match response {
            Response::Error(Failure { kind, .. }) => kind,
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn authenticate_returns_username() {
        let (_tmp, service) = service();
        let token = login(&service);
        assert_eq!(
            dispatch(&service, Request::Authenticate { token }),
            Response::Ok(Reply::Username("alice".into()))
        );
    }

    #[test]
    fn file_round_trip_through_dispatch() {
        let (_tmp, service) = service();
        let token = login(&service);

        let upload = Request::Upload {
            token: token.clone(),
            path: "/notes.txt".into(),
            body: b"hello".to_vec(),
        };
        assert!(dispatch(&service, upload).is_ok());

        let download = Request::Download {
            token: token.clone(),
            path: "notes.txt".into(),
        };
        assert_eq!(
            dispatch(&service, download),
            Response::Ok(Reply::Body(b"hello".to_vec()))
        );

        let list = Request::List {
            token,
            path: String::new(),
        };
        assert_eq!(
            dispatch(&service, list),
            Response::Ok(Reply::Entries(vec![DirEntry {
                name: "notes.txt".into(),
                is_dir: false
            }]))
        );
    }

    #[test]
    fn failures_are_tagged() {
        let (_tmp, service) = service();
        assert_eq!(
            kind(dispatch(&service, Request::Pwd { token: String::new() })),
            ErrorKind::Authentication
        );

        let token = login(&service);
        assert_eq!(
            kind(dispatch(
                &service,
                Request::Remove {
                    token: token.clone(),
                    path: "/".into()
                }
            )),
            ErrorKind::Validation
        );
        assert_eq!(
            kind(dispatch(
                &service,
                Request::Download {
                    token,
                    path: "missing".into()
                }
            )),
            ErrorKind::NotFound
        );
    }
}
