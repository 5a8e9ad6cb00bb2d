use std::net::SocketAddr;
use std::sync::Arc;

use rax_locker::error::ErrorKind;
use rax_locker::protocol::{Failure, Reply, Request, Response};
use rax_locker::{LockerService, Server, ServerConfig};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

// Start a server on an ephemeral port
async fn start(max_clients: usize) -> (TempDir, SocketAddr) {
    let tmp = TempDir::new().unwrap();
    let mut config = ServerConfig::default();
    config.startup.port = 0;
    config.startup.max_clients = max_clients;
    config.startup.max_request_bytes = 1024;
    config.startup.storage_root = tmp.path().join("store").to_string_lossy().into_owned();
    config.startup.database_path = tmp.path().join("locker.db").to_string_lossy().into_owned();

    let service = Arc::new(LockerService::from_config(&config).unwrap());
    let server = Server::bind(&config.startup, service).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    (tmp, addr)
}

struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    async fn open(addr: SocketAddr) -> Self {
        let (read_half, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    async fn send_raw(&mut self, line: &str) -> Option<Response> {
        self.send_bytes(line.as_bytes()).await
    }

    async fn send_bytes(&mut self, line: &[u8]) -> Option<Response> {
        self.writer.write_all(line).await.unwrap();
        self.writer.write_all(b"\n").await.unwrap();
        self.writer.flush().await.unwrap();
        self.read().await
    }

    async fn send(&mut self, request: &Request) -> Response {
        let line = serde_json::to_string(request).unwrap();
        self.send_raw(&line).await.unwrap()
    }

    async fn read(&mut self) -> Option<Response> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await.unwrap();
        if n == 0 {
            return None;
        }
        Some(serde_json::from_str(&line).unwrap())
    }

    async fn login(&mut self, username: &str) -> String {
        let signup = Request::Signup {
            username: username.into(),
            password: "Passw0rd".into(),
        };
        assert_eq!(self.send(&signup).await, Response::Ok(Reply::Empty));

        let login = Request::Login {
            username: username.into(),
            password: "Passw0rd".into(),
        };
        match self.send(&login).await {
            Response::Ok(Reply::Token(token)) => token,
            other => panic!("login failed: {other:?}"),
        }
    }
}

fn kind(response: Option<Response>) -> ErrorKind {
    match response {
        Some(Response::Error(Failure { kind, .. })) => kind,
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_download_over_tcp() {
    let (_tmp, addr) = start(8).await;
    let mut conn = Connection::open(addr).await;
    let token = conn.login("alice").await;

    let upload = Request::Upload {
        token: token.clone(),
        path: "/hello.txt".into(),
        body: b"hello world".to_vec(),
    };
    assert_eq!(conn.send(&upload).await, Response::Ok(Reply::Empty));

    let download = Request::Download {
        token: token.clone(),
        path: "hello.txt".into(),
    };
    assert_eq!(
        conn.send(&download).await,
        Response::Ok(Reply::Body(b"hello world".to_vec()))
    );

    assert_eq!(
        conn.send(&Request::Pwd { token }).await,
        Response::Ok(Reply::Path("/".into()))
    );
}

#[tokio::test]
async fn malformed_requests_keep_connection_open() {
    let (_tmp, addr) = start(8).await;
    let mut conn = Connection::open(addr).await;

    assert_eq!(kind(conn.send_raw("not json").await), ErrorKind::BadRequest);
    assert_eq!(
        kind(conn.send_raw(r#"{"method":"pwd"}"#).await),
        ErrorKind::Authentication
    );

    let token = conn.login("bob").await;
    assert!(conn.send(&Request::Authenticate { token }).await.is_ok());
}

#[tokio::test]
async fn non_utf8_requests_keep_connection_open() {
    let (_tmp, addr) = start(8).await;
    let mut conn = Connection::open(addr).await;

    assert_eq!(kind(conn.send_bytes(b"\xff\xfe").await), ErrorKind::BadRequest);
    assert_eq!(
        kind(conn.send_raw(r#"{"method":"pwd"}"#).await),
        ErrorKind::Authentication
    );
}

#[tokio::test]
async fn over_long_request_is_skipped() {
    let (_tmp, addr) = start(8).await;
    let mut conn = Connection::open(addr).await;

    let huge = format!(r#"{{"method":"pwd","token":"{}"}}"#, "x".repeat(4096));
    assert_eq!(kind(conn.send_raw(&huge).await), ErrorKind::BadRequest);

    // the next line is read from a clean boundary
    let token = conn.login("carol").await;
    assert_eq!(
        conn.send(&Request::Pwd { token }).await,
        Response::Ok(Reply::Path("/".into()))
    );
}

#[tokio::test]
async fn connections_over_limit_are_refused() {
    let (_tmp, addr) = start(1).await;
    let mut first = Connection::open(addr).await;
    // a reply proves the first connection holds its slot
    assert_eq!(kind(first.send_raw(r#"{"method":"pwd"}"#).await), ErrorKind::Authentication);

    let mut second = Connection::open(addr).await;
    assert_eq!(kind(second.read().await), ErrorKind::Unavailable);
    assert!(second.read().await.is_none());

    drop(first);
}
