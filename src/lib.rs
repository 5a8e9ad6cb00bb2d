pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod navigate;
pub mod protocol;
pub mod server;
pub mod service;
pub mod storage;
pub mod store;

pub use config::ServerConfig;
pub use server::Server;
pub use service::LockerService;
