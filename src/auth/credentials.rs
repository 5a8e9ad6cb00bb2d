//! Credential storage and account creation
//!
//! Passwords are stored as SHA-256(password ‖ salt) with a fresh random
//! salt per account. Each account owns exactly one root directory, created
//! together with its records.

use super::crypto::{TokenGenerator, digests_match, hash_password};
use crate::error::{AuthError, ServiceError, ServiceResult, ValidationError};
use crate::navigate::DirectoryTracker;
use crate::store::{AccountRecord, CredentialRecord, RecordStore, WorkingDirectoryRecord};
use log::{error, info};
use std::fs;
use std::sync::Arc;

/// Verifies and creates username/password pairs
pub struct CredentialStore {
    store: Arc<dyn RecordStore>,
    tokens: Arc<TokenGenerator>,
    directories: Arc<DirectoryTracker>,
    max_username_length: usize,
}

/// Basic sanitation of a username before it reaches storage or the filesystem.
fn validate_username(username: &str, max_length: usize) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::InvalidUsername("username cannot be empty".into()));
    }
    if username.len() > max_length {
        return Err(ValidationError::InvalidUsername(format!(
            "username cannot be longer than {max_length} bytes"
        )));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '/')
    {
        return Err(ValidationError::InvalidUsername(
            "username cannot contain whitespace, control characters, or '/'".into(),
        ));
    }
    Ok(())
}

/// Passwords need a digit plus both upper and lowercase letters.
fn validate_password(password: &str) -> Result<(), ValidationError> {
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::WeakPassword(
            "password must contain numbers".into(),
        ));
    }
    let lowercase = password.chars().any(|c| c.is_ascii_lowercase());
    let uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    if !(lowercase && uppercase) {
        return Err(ValidationError::WeakPassword(
            "password must contain upper and lowercase letters".into(),
        ));
    }
    Ok(())
}

impl CredentialStore {
    pub fn new(
        store: Arc<dyn RecordStore>,
        tokens: Arc<TokenGenerator>,
        directories: Arc<DirectoryTracker>,
        max_username_length: usize,
    ) -> Self {
        Self {
            store,
            tokens,
            directories,
            max_username_length,
        }
    }

    /// Create an account and its root directory. Returns the root identifier.
    pub fn create_account(&self, username: &str, password: &str) -> ServiceResult<String> {
        validate_username(username, self.max_username_length)?;

        if self.store.get_credential(username)?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "username {username} already exists"
            )));
        }

        validate_password(password)?;

        let salt = self.tokens.salt();
        let credential = CredentialRecord {
            username: username.to_string(),
            hash: hash_password(password, &salt),
            salt,
        };

        let root_id = self.tokens.root_id();
        let root = self.directories.root_path(&root_id);
        fs::create_dir(&root).map_err(|e| {
            error!("Could not create root {} for {}: {}", root.display(), username, e);
            ServiceError::from(e)
        })?;

        let account = AccountRecord {
            username: username.to_string(),
            root_id: root_id.clone(),
        };
        let working_directory = WorkingDirectoryRecord {
            username: username.to_string(),
            path: root.to_string_lossy().into_owned(),
        };

        if let Err(e) = self
            .store
            .create_account(&credential, &account, &working_directory)
        {
            // records were not written; the root must not outlive them
            if let Err(cleanup) = fs::remove_dir(&root) {
                error!("Could not remove orphan root {}: {}", root.display(), cleanup);
            }
            return Err(e.into());
        }

        info!("Created account {} with root {}", username, root_id);
        Ok(root_id)
    }

    /// Check a username/password pair against the stored hash
    pub fn verify(&self, username: &str, password: &str) -> ServiceResult<()> {
        let credential = self.store.get_credential(username)?.ok_or_else(|| {
            ServiceError::NotFound(format!("username {username} does not exist"))
        })?;

        if digests_match(&hash_password(password, &credential.salt), &credential.hash) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }

    pub fn remove(&self, username: &str) -> ServiceResult<()> {
        self.store.delete_credential(username)?;
        Ok(())
    }
}
