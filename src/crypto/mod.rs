//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - Argon2id password-based key derivation and salts (`kdf`)
//! - Master-password hashing with constant-time verification (`password`)
//! - Self-zeroing master key and per-record key derivation (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod password;
mod random;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive_key, ...};
pub use encryption::{decrypt, encrypt, NONCE_LEN};
pub use kdf::{
    derive_key, generate_salt, KdfParams, KEY_LEN, RECOMMENDED_MEMORY_KIB, SALT_LEN,
};
pub use keys::MasterKey;
pub use password::{hash_password, verify_password};
