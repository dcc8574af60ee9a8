//! Plaintext credential types handed to and returned from the vault.
//!
//! These only ever exist in memory.  The payload (`auth_data`) is zeroed
//! when a value is dropped and is redacted from `Debug` output.

use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::Zeroize;

/// A decrypted credential belonging to an external provider.
#[derive(Clone, Serialize)]
pub struct Credential {
    pub id: i64,
    /// Opaque reference to the owning provider.
    pub provider_id: i64,
    pub label: String,
    /// Free-form kind tag, e.g. "token", "ssh_key", "oauth".
    pub auth_type: String,
    /// The secret payload in plaintext.
    pub auth_data: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a caller supplies when storing a new credential.
#[derive(Clone)]
pub struct NewCredential {
    pub provider_id: i64,
    pub label: String,
    pub auth_type: String,
    pub auth_data: String,
}

impl NewCredential {
    pub fn new(
        provider_id: i64,
        label: impl Into<String>,
        auth_type: impl Into<String>,
        auth_data: impl Into<String>,
    ) -> Self {
        Self {
            provider_id,
            label: label.into(),
            auth_type: auth_type.into(),
            auth_data: auth_data.into(),
        }
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.auth_data.zeroize();
    }
}

impl Drop for NewCredential {
    fn drop(&mut self) {
        self.auth_data.zeroize();
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("provider_id", &self.provider_id)
            .field("label", &self.label)
            .field("auth_type", &self.auth_type)
            .field("auth_data", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl std::fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewCredential")
            .field("provider_id", &self.provider_id)
            .field("label", &self.label)
            .field("auth_type", &self.auth_type)
            .field("auth_data", &"[REDACTED]")
            .finish()
    }
}
