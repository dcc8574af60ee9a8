//! In-memory key material.
//!
//! The master key lives in a `MasterKey` that zeroes itself on drop.  A
//! per-record key is derived by running Argon2id again with the master key
//! bytes as the password and the record's own salt, so every record is
//! encrypted under a distinct key.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::kdf::{derive_key, KdfParams, KEY_LEN};
use crate::errors::Result;

/// A wrapper around a 32-byte master key that automatically zeroes
/// its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Take ownership of freshly derived key bytes.
    ///
    /// The source buffer is zeroed when the `Zeroizing` wrapper drops.
    pub fn from_derived(bytes: Zeroizing<[u8; KEY_LEN]>) -> Self {
        Self { bytes: *bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the key for one record from this master key and the record salt.
    pub fn derive_record_key(
        &self,
        record_salt: &[u8],
        params: &KdfParams,
    ) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        derive_key(&self.bytes, record_salt, params)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
