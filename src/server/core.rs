use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::client::{handle_client, write_response};
use crate::config::StartupConfig;
use crate::error::ErrorKind;
use crate::protocol::Response;
use crate::service::LockerService;

pub struct Server {
    listener: TcpListener,
    service: Arc<LockerService>,
    connections: Arc<Semaphore>,
    max_clients: usize,
    max_request_bytes: usize,
}

impl Server {
    /// Bind the request listener described by `config`
    pub async fn bind(config: &StartupConfig, service: Arc<LockerService>) -> io::Result<Self> {
        let socket = config.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(e);
            }
        };

        Ok(Self {
            listener,
            service,
            connections: Arc::new(Semaphore::new(config.max_clients)),
            max_clients: config.max_clients,
            max_request_bytes: config.max_request_bytes,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, one task per client
    pub async fn run(self) {
        let socket = self
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        info!(
            "Starting RAX locker server on {} (max {} clients)",
            socket, self.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let permit = match Arc::clone(&self.connections).try_acquire_owned() {
                        Ok(permit) => permit,
                        Err(_) => {
                            warn!("Refusing {}: {} clients connected", addr, self.max_clients);
                            tokio::spawn(refuse_client(stream, addr));
                            continue;
                        }
                    };

                    let service = Arc::clone(&self.service);
                    let max_request_bytes = self.max_request_bytes;

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        info!("Accepted client {}", addr);
                        handle_client(stream, addr, service, max_request_bytes).await;
                        drop(permit);
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Tell a client over the connection limit to come back later
async fn refuse_client(mut stream: TcpStream, addr: SocketAddr) {
    let response = Response::failure(
        ErrorKind::Unavailable,
        "too many connections, try again later",
    );
    if let Err(e) = write_response(&mut stream, &response).await {
        warn!("Failed to refuse {}: {}", addr, e);
    }
}
