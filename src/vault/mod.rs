//! Vault module: the master-password lifecycle and encrypted credentials.
//!
//! This module provides:
//! - `Credential` and `NewCredential` plaintext types (`credential`)
//! - `VaultService`, the locked/unlocked state machine over the store (`service`)

pub mod credential;
pub mod service;

// Re-export the most commonly used items.
pub use credential::{Credential, NewCredential};
pub use service::{VaultService, MASTER_PASSWORD_HASH_KEY, MASTER_PASSWORD_SALT_KEY};
