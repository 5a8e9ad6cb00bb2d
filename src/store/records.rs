//! Persisted record types

/// Salted password hash for one username
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub salt: String,
    pub hash: String,
}

/// Maps a username to the identifier of its root directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub username: String,
    pub root_id: String,
}

/// A live session, keyed by the hash of its token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token_hash: String,
    pub username: String,
    /// Expiration instant in epoch milliseconds
    pub expires_at: u64,
}

/// Absolute host path of a user's current directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectoryRecord {
    pub username: String,
    pub path: String,
}
