//! SQLite-backed record store
//!
//! Tables:
//! - `sessions`: token_hash, username, expires_at
//! - `credentials`: username, salt, hash
//! - `accounts`: username, root_id
//! - `working_directories`: username, path

use super::{
    AccountRecord, CredentialRecord, RecordStore, SessionRecord, StoreResult,
    WorkingDirectoryRecord,
};
use crate::error::StoreError;
use log::info;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS sessions (
        token_hash TEXT PRIMARY KEY,
        username TEXT NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sessions_username ON sessions(username);

    CREATE TABLE IF NOT EXISTS credentials (
        username TEXT PRIMARY KEY,
        salt TEXT NOT NULL,
        hash TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts (
        username TEXT PRIMARY KEY,
        root_id TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS working_directories (
        username TEXT PRIMARY KEY,
        path TEXT NOT NULL
    );";

/// Record store over a single SQLite connection
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at the given path.
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(db_path)?;

        // WAL mode for concurrent readers and crash safety
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        info!("Opened record store at {}", db_path.display());
        Self::initialize(conn)
    }

    /// In-memory database (for tests and ephemeral servers)
    pub fn in_memory() -> StoreResult<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl RecordStore for SqliteStore {
    fn get_credential(&self, username: &str) -> StoreResult<Option<CredentialRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT username, salt, hash FROM credentials WHERE username = ?1",
                params![username],
                |row| {
                    Ok(CredentialRecord {
                        username: row.get(0)?,
                        salt: row.get(1)?,
                        hash: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn delete_credential(&self, username: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM credentials WHERE username = ?1",
            params![username],
        )?;
        Ok(())
    }

    fn get_account(&self, username: &str) -> StoreResult<Option<AccountRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT username, root_id FROM accounts WHERE username = ?1",
                params![username],
                |row| {
                    Ok(AccountRecord {
                        username: row.get(0)?,
                        root_id: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn list_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT username, root_id FROM accounts ORDER BY username")?;
        let accounts = stmt
            .query_map([], |row| {
                Ok(AccountRecord {
                    username: row.get(0)?,
                    root_id: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(accounts)
    }

    fn delete_account(&self, username: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM accounts WHERE username = ?1", params![username])?;
        Ok(())
    }

    fn create_account(
        &self,
        credential: &CredentialRecord,
        account: &AccountRecord,
        working_directory: &WorkingDirectoryRecord,
    ) -> StoreResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO credentials (username, salt, hash) VALUES (?1, ?2, ?3)",
            params![credential.username, credential.salt, credential.hash],
        );
        match inserted {
            Err(e) if is_constraint_violation(&e) => {
                return Err(StoreError::Duplicate(credential.username.clone()));
            }
            other => other?,
        };

        tx.execute(
            "INSERT INTO accounts (username, root_id) VALUES (?1, ?2)",
            params![account.username, account.root_id],
        )
        .map_err(|e| {
            if is_constraint_violation(&e) {
                StoreError::Duplicate(account.username.clone())
            } else {
                StoreError::from(e)
            }
        })?;

        tx.execute(
            "INSERT INTO working_directories (username, path) VALUES (?1, ?2)
             ON CONFLICT(username) DO UPDATE SET path = excluded.path",
            params![working_directory.username, working_directory.path],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_session(&self, token_hash: &str) -> StoreResult<Option<SessionRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT token_hash, username, expires_at FROM sessions WHERE token_hash = ?1",
                params![token_hash],
                |row| {
                    Ok(SessionRecord {
                        token_hash: row.get(0)?,
                        username: row.get(1)?,
                        expires_at: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?1",
            params![token_hash],
        )?;
        Ok(())
    }

    fn delete_sessions_for(&self, username: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM sessions WHERE username = ?1", params![username])?;
        Ok(())
    }

    fn replace_session(&self, session: &SessionRecord) -> StoreResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM sessions WHERE username = ?1",
            params![session.username],
        )?;
        tx.execute(
            "INSERT INTO sessions (token_hash, username, expires_at) VALUES (?1, ?2, ?3)",
            params![session.token_hash, session.username, session.expires_at as i64],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn get_working_directory(&self, username: &str) -> StoreResult<Option<WorkingDirectoryRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT username, path FROM working_directories WHERE username = ?1",
                params![username],
                |row| {
                    Ok(WorkingDirectoryRecord {
                        username: row.get(0)?,
                        path: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn put_working_directory(&self, record: &WorkingDirectoryRecord) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO working_directories (username, path) VALUES (?1, ?2)
             ON CONFLICT(username) DO UPDATE SET path = excluded.path",
            params![record.username, record.path],
        )?;
        Ok(())
    }

    fn delete_working_directory(&self, username: &str) -> StoreResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM working_directories WHERE username = ?1",
            params![username],
        )?;
        Ok(())
    }
}
