//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Parameters are configurable via `KdfParams`
//! (loaded from `credvault.toml` or sensible defaults).
//!
//! The same derivation serves three roles: the master key, the stored
//! master-password hash, and every per-record key (with the master key
//! bytes as the password input).

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use super::random::fill_random;
use crate::errors::{Result, VaultError};

/// Length of every salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum accepted memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Memory cost a production vault should use, in KiB (64 MB).
pub const RECOMMENDED_MEMORY_KIB: u32 = 65_536;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings`.  Changing them after setup
/// makes the stored master-password hash unverifiable, so they must stay
/// fixed for the lifetime of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 1).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl KdfParams {
    /// True when the memory cost is accepted but below the production level.
    pub fn is_below_recommended(&self) -> bool {
        self.memory_kib < RECOMMENDED_MEMORY_KIB
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: RECOMMENDED_MEMORY_KIB,
            iterations: 1,
            parallelism: 4,
        }
    }
}

/// Derive a 32-byte key from a password and salt using Argon2id.
///
/// The same password + salt + params always produce the same key.  The
/// returned buffer is zeroed when dropped, including on early returns.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    kdf_params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if kdf_params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            kdf_params.memory_kib
        )));
    }
    if kdf_params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if kdf_params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let params = Params::new(
        kdf_params.memory_kib,
        kdf_params.iterations,
        kdf_params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, key.as_mut())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
///
/// Fails only when the OS entropy source does; callers must not retry.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    Ok(salt)
}
