//! Session management
//!
//! Issues, validates, and expires session tokens. Only the SHA-256 of a
//! token is stored; the plaintext leaves the server exactly once, in the
//! login reply. Each user has at most one live session.

use super::clock::Clock;
use super::crypto::{TokenGenerator, hash_token};
use crate::error::{AuthError, ServiceResult};
use crate::navigate::DirectoryTracker;
use crate::store::{RecordStore, SessionRecord};
use log::info;
use std::sync::Arc;
use std::time::Duration;

/// Maps opaque tokens to usernames with a bounded lifetime
pub struct SessionManager {
    store: Arc<dyn RecordStore>,
    tokens: Arc<TokenGenerator>,
    clock: Arc<dyn Clock>,
    directories: Arc<DirectoryTracker>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn RecordStore>,
        tokens: Arc<TokenGenerator>,
        clock: Arc<dyn Clock>,
        directories: Arc<DirectoryTracker>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            tokens,
            clock,
            directories,
            ttl,
        }
    }

    /// Start a session for `username`, dropping any earlier one.
    ///
    /// Returns the plaintext token.
    pub fn issue(&self, username: &str) -> ServiceResult<String> {
        let token = self.tokens.session_token();
        let ttl_millis = u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX);
        let expires_at = self.clock.now_millis().saturating_add(ttl_millis);

        self.store.replace_session(&SessionRecord {
            token_hash: hash_token(&token),
            username: username.to_string(),
            expires_at,
        })?;

        info!("Issued session for {} (expires at {})", username, expires_at);
        Ok(token)
    }

    /// Resolve a token to its username without side effects on the working
    /// directory. Expired sessions are deleted on sight.
    pub fn authorize(&self, token: &str) -> ServiceResult<String> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken.into());
        }

        let token_hash = hash_token(token);
        let session = self
            .store
            .get_session(&token_hash)?
            .ok_or(AuthError::InvalidToken)?;

        if self.clock.now_millis() >= session.expires_at {
            self.store.delete_session(&token_hash)?;
            info!("Session for {} expired", session.username);
            return Err(AuthError::Expired.into());
        }

        Ok(session.username)
    }

    /// Resolve a token and move the user back to their root directory
    pub fn validate(&self, token: &str) -> ServiceResult<String> {
        let username = self.authorize(token)?;
        self.directories.reset(&username)?;
        Ok(username)
    }

    /// Drop every session of `username`
    pub fn invalidate(&self, username: &str) -> ServiceResult<()> {
        self.store.delete_sessions_for(username)?;
        info!("Invalidated sessions for {}", username);
        Ok(())
    }
}
