//! Authentication system
//!
//! Handles account credentials, session tokens, and the randomness and
//! clock they depend on.

pub mod clock;
pub mod credentials;
pub mod crypto;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::CredentialStore;
pub use crypto::TokenGenerator;
pub use session::SessionManager;
