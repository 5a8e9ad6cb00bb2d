//! Account operations: authenticate, signup, login, logout, delete

use super::LockerService;
use crate::error::{ServiceError, ServiceResult};
use crate::storage::operations::remove_tree;
use log::{error, info};
use std::path::PathBuf;

impl LockerService {
    /// Resolve a token to its username and move the user back to their root
    pub fn authenticate(&self, token: &str) -> ServiceResult<String> {
        self.sessions.validate(token)
    }

    /// Create an account, refusing once the database-wide quota is reached
    pub fn signup(&self, username: &str, password: &str) -> ServiceResult<()> {
        let roots: Vec<PathBuf> = self
            .store
            .list_accounts()?
            .iter()
            .map(|account| self.directories.root_path(&account.root_id))
            .collect();
        self.quota.check_aggregate(&roots)?;

        self.credentials.create_account(username, password)?;
        Ok(())
    }

    /// Verify credentials and start a fresh session at the user's root.
    ///
    /// Returns the plaintext session token.
    pub fn login(&self, username: &str, password: &str) -> ServiceResult<String> {
        self.credentials.verify(username, password)?;
        let token = self.sessions.issue(username)?;
        self.directories.reset(username)?;
        info!("{} logged in", username);
        Ok(token)
    }

    pub fn logout(&self, token: &str) -> ServiceResult<()> {
        let username = self.sessions.authorize(token)?;
        self.sessions.invalidate(&username)?;
        info!("{} logged out", username);
        Ok(())
    }

    /// Remove every record of the caller and their whole root tree.
    ///
    /// Each step runs even if an earlier one failed; the first failure is
    /// returned.
    pub fn delete_account(&self, token: &str) -> ServiceResult<()> {
        let username = self.sessions.authorize(token)?;
        let mut first_error: Option<ServiceError> = None;
        let mut record = |step: &str, result: ServiceResult<()>| {
            if let Err(e) = result {
                error!("Deleting {}: {} failed: {}", username, step, e);
                first_error.get_or_insert(e);
            }
        };

        let root = self.directories.root_for(&username);

        record("sessions", self.sessions.invalidate(&username));
        record("credentials", self.credentials.remove(&username));
        record(
            "account",
            self.store.delete_account(&username).map_err(ServiceError::from),
        );
        record("working directory", self.directories.forget(&username));
        match root {
            Ok(root) => record("root tree", remove_tree(&root).map_err(ServiceError::from)),
            Err(e) => record("root lookup", Err(e)),
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                info!("Deleted account {}", username);
                Ok(())
            }
        }
    }
}
