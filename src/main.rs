//! RAX Locker - Entry Point
//!
//! A multi-user file locker: per-account sandboxed storage behind session
//! tokens, served as newline-delimited JSON over TCP.

use log::{error, info};
use std::process;
use std::sync::Arc;

use rax_locker::{LockerService, Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching locker server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let service = match LockerService::from_config(&config) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::bind(&config.startup, service).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            process::exit(1);
        }
    };

    server.run().await;
}
