//! Locker service
//!
//! Composes credentials, sessions, working directories, and sandboxed
//! storage into the request operations exposed over the wire. Every
//! operation is a bounded, blocking unit of work; the transport runs them
//! off the async runtime.

mod accounts;
mod files;

use crate::auth::{Clock, CredentialStore, SessionManager, SystemClock, TokenGenerator};
use crate::config::ServerConfig;
use crate::error::ServiceResult;
use crate::navigate::DirectoryTracker;
use crate::storage::{DiskUsage, PathSandbox, QuotaEnforcer, usage};
use crate::store::{MemoryStore, RecordStore, SqliteStore};
use log::info;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Database path that selects the in-process record store
pub const IN_MEMORY_DATABASE: &str = ":memory:";

/// All request operations over one storage root and record store
pub struct LockerService {
    store: Arc<dyn RecordStore>,
    credentials: CredentialStore,
    sessions: SessionManager,
    directories: Arc<DirectoryTracker>,
    quota: QuotaEnforcer,
}

/// The authenticated caller of a file operation
struct Caller {
    username: String,
    sandbox: PathSandbox,
}

impl LockerService {
    /// Build the service from configuration: the SQLite store (or the
    /// in-memory one for `:memory:`), the configured disk-usage strategy,
    /// and the system clock.
    pub fn from_config(config: &ServerConfig) -> ServiceResult<Self> {
        let store: Arc<dyn RecordStore> = if config.startup.database_path == IN_MEMORY_DATABASE {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(SqliteStore::open(Path::new(&config.startup.database_path))?)
        };

        Self::new(
            config,
            store,
            usage::from_mode(config.startup.disk_usage),
            Arc::new(SystemClock),
        )
    }

    /// Build the service from explicit collaborators. The storage root is
    /// created if missing and canonicalized.
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn RecordStore>,
        disk_usage: Arc<dyn DiskUsage>,
        clock: Arc<dyn Clock>,
    ) -> ServiceResult<Self> {
        let storage_root = config.startup.storage_root_path();
        fs::create_dir_all(&storage_root)?;
        let storage_root = storage_root.canonicalize()?;
        info!("Storage root: {}", storage_root.display());

        let tokens = Arc::new(TokenGenerator::new());
        let directories = Arc::new(DirectoryTracker::new(store.clone(), storage_root));

        Ok(Self {
            credentials: CredentialStore::new(
                store.clone(),
                tokens.clone(),
                directories.clone(),
                config.limits.max_username_length,
            ),
            sessions: SessionManager::new(
                store.clone(),
                tokens,
                clock,
                directories.clone(),
                config.startup.session_ttl(),
            ),
            quota: QuotaEnforcer::new(config.limits.clone(), disk_usage),
            directories,
            store,
        })
    }

    /// Directory holding every account root
    pub fn storage_root(&self) -> &Path {
        self.directories.storage_root()
    }

    /// Validate the token and build the caller's sandbox from their root and
    /// stored working directory
    fn caller(&self, token: &str) -> ServiceResult<Caller> {
        let username = self.sessions.authorize(token)?;
        let root = self.directories.root_for(&username)?;
        let cwd = self.directories.current(&username, &root)?;
        Ok(Caller {
            sandbox: PathSandbox::new(&root, &cwd),
            username,
        })
    }
}
