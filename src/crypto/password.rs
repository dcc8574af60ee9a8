//! Master-password hashing and verification.
//!
//! The hash is the Argon2id output for (password, master salt), i.e. the
//! same derivation that produces the master key.  Verification re-derives
//! it and compares in constant time.

use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::kdf::{derive_key, KdfParams, KEY_LEN};
use crate::errors::Result;

/// Hash a master password with its salt.
pub fn hash_password(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    derive_key(password, salt, params)
}

/// Check `password` against a stored hash without a timing side channel.
///
/// A stored hash of the wrong length never matches.
pub fn verify_password(
    password: &[u8],
    salt: &[u8],
    expected_hash: &[u8],
    params: &KdfParams,
) -> Result<bool> {
    let hash = hash_password(password, salt, params)?;
    Ok(hash.as_slice().ct_eq(expected_hash).into())
}
