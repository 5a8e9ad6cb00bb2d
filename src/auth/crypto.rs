//! Token, salt, and digest helpers
//!
//! A single CSPRNG is seeded from OS entropy when the generator is built
//! and every token, salt, and root identifier is drawn from it directly.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

/// Session token length before hex encoding (32 bytes = 64 hex chars)
const TOKEN_BYTES: usize = 32;

/// Salt length before hex encoding
const SALT_BYTES: usize = 16;

/// Root directory identifier length before hex encoding
const ROOT_ID_BYTES: usize = 8;

/// Process-wide source of random hex strings
pub struct TokenGenerator {
    rng: Mutex<StdRng>,
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenGenerator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    fn random_hex(&self, len: usize) -> String {
        let mut bytes = vec![0u8; len];
        self.rng.lock().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Fresh session token handed to the client (never stored)
    pub fn session_token(&self) -> String {
        self.random_hex(TOKEN_BYTES)
    }

    /// Fresh per-account password salt
    pub fn salt(&self) -> String {
        self.random_hex(SALT_BYTES)
    }

    /// Fresh root directory identifier, always starting with `r`
    pub fn root_id(&self) -> String {
        format!("r{}", self.random_hex(ROOT_ID_BYTES))
    }
}

/// One-way hash of a session token; only this is persisted
pub fn hash_token(token: &str) -> String {
    let mut h = Sha256::new();
    h.update(token.as_bytes());
    hex::encode(h.finalize())
}

/// SHA-256 over password followed by salt
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut h = Sha256::new();
    h.update(password.as_bytes());
    h.update(salt.as_bytes());
    hex::encode(h.finalize())
}

/// Constant-time comparison of two digests
pub fn digests_match(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
