//! OS-backed randomness for salts and nonces.

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::{Result, VaultError};

/// Fill `buf` from the operating system CSPRNG.
///
/// An exhausted or unavailable entropy source surfaces as
/// `EntropyFailure`, which is fatal for the calling operation.
pub fn fill_random(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| VaultError::EntropyFailure(e.to_string()))
}
