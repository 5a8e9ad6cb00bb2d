//! Keyed record store
//!
//! Four keyed tables back the server: sessions, credentials, accounts, and
//! working directories. Every method is a single atomic operation; callers
//! never hold a store lock between calls.

pub mod memory;
pub mod records;
pub mod sqlite;

pub use memory::MemoryStore;
pub use records::{AccountRecord, CredentialRecord, SessionRecord, WorkingDirectoryRecord};
pub use sqlite::SqliteStore;

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Get/put/delete by primary key over the four tables, plus the two
/// compound writes that must be all-or-nothing.
pub trait RecordStore: Send + Sync {
    // ── Credentials ──
    fn get_credential(&self, username: &str) -> StoreResult<Option<CredentialRecord>>;
    fn delete_credential(&self, username: &str) -> StoreResult<()>;

    // ── Accounts ──
    fn get_account(&self, username: &str) -> StoreResult<Option<AccountRecord>>;
    fn list_accounts(&self) -> StoreResult<Vec<AccountRecord>>;
    fn delete_account(&self, username: &str) -> StoreResult<()>;

    /// Inserts credential, account, and initial working directory together.
    /// Fails with `StoreError::Duplicate` if the username is taken.
    fn create_account(
        &self,
        credential: &CredentialRecord,
        account: &AccountRecord,
        working_directory: &WorkingDirectoryRecord,
    ) -> StoreResult<()>;

    // ── Sessions ──
    fn get_session(&self, token_hash: &str) -> StoreResult<Option<SessionRecord>>;
    fn delete_session(&self, token_hash: &str) -> StoreResult<()>;
    fn delete_sessions_for(&self, username: &str) -> StoreResult<()>;

    /// Drops every session of `session.username` and inserts `session`.
    fn replace_session(&self, session: &SessionRecord) -> StoreResult<()>;

    // ── Working directories ──
    fn get_working_directory(&self, username: &str) -> StoreResult<Option<WorkingDirectoryRecord>>;
    /// Upsert; last writer wins.
    fn put_working_directory(&self, record: &WorkingDirectoryRecord) -> StoreResult<()>;
    fn delete_working_directory(&self, username: &str) -> StoreResult<()>;
}
