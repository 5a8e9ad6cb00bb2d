//! In-memory record store
//!
//! Same contract as the SQLite store over four hash maps. Used by tests and
//! by deployments configured with `database_path = ":memory:"`.

use super::{
    AccountRecord, CredentialRecord, RecordStore, SessionRecord, StoreResult,
    WorkingDirectoryRecord,
};
use crate::error::StoreError;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct Tables {
    sessions: HashMap<String, SessionRecord>,
    credentials: HashMap<String, CredentialRecord>,
    accounts: HashMap<String, AccountRecord>,
    working_directories: HashMap<String, WorkingDirectoryRecord>,
}

/// Hash-map backed store guarded by a single lock
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn get_credential(&self, username: &str) -> StoreResult<Option<CredentialRecord>> {
        Ok(self.tables.read().credentials.get(username).cloned())
    }

    fn delete_credential(&self, username: &str) -> StoreResult<()> {
        self.tables.write().credentials.remove(username);
        Ok(())
    }

    fn get_account(&self, username: &str) -> StoreResult<Option<AccountRecord>> {
        Ok(self.tables.read().accounts.get(username).cloned())
    }

    fn list_accounts(&self) -> StoreResult<Vec<AccountRecord>> {
        let mut accounts: Vec<_> = self.tables.read().accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(accounts)
    }

    fn delete_account(&self, username: &str) -> StoreResult<()> {
        self.tables.write().accounts.remove(username);
        Ok(())
    }

    fn create_account(
        &self,
        credential: &CredentialRecord,
        account: &AccountRecord,
        working_directory: &WorkingDirectoryRecord,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.credentials.contains_key(&credential.username)
            || tables.accounts.contains_key(&account.username)
        {
            return Err(StoreError::Duplicate(credential.username.clone()));
        }

        tables
            .credentials
            .insert(credential.username.clone(), credential.clone());
        tables
            .accounts
            .insert(account.username.clone(), account.clone());
        tables
            .working_directories
            .insert(working_directory.username.clone(), working_directory.clone());
        Ok(())
    }

    fn get_session(&self, token_hash: &str) -> StoreResult<Option<SessionRecord>> {
        Ok(self.tables.read().sessions.get(token_hash).cloned())
    }

    fn delete_session(&self, token_hash: &str) -> StoreResult<()> {
        self.tables.write().sessions.remove(token_hash);
        Ok(())
    }

    fn delete_sessions_for(&self, username: &str) -> StoreResult<()> {
        self.tables
            .write()
            .sessions
            .retain(|_, session| session.username != username);
        Ok(())
    }

    fn replace_session(&self, session: &SessionRecord) -> StoreResult<()> {
        let mut tables = self.tables.write();
        tables
            .sessions
            .retain(|_, existing| existing.username != session.username);
        tables
            .sessions
            .insert(session.token_hash.clone(), session.clone());
        Ok(())
    }

    fn get_working_directory(&self, username: &str) -> StoreResult<Option<WorkingDirectoryRecord>> {
        Ok(self.tables.read().working_directories.get(username).cloned())
    }

    fn put_working_directory(&self, record: &WorkingDirectoryRecord) -> StoreResult<()> {
        self.tables
            .write()
            .working_directories
            .insert(record.username.clone(), record.clone());
        Ok(())
    }

    fn delete_working_directory(&self, username: &str) -> StoreResult<()> {
        self.tables.write().working_directories.remove(username);
        Ok(())
    }
}
