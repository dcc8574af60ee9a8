use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

/// All errors that can occur in CredVault.
///
/// Messages never include passwords, keys, salts or decrypted payloads.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Vault state errors ---
    #[error("Vault is locked — unlock it with the master password first")]
    Locked,

    #[error("Master password is already configured")]
    AlreadyConfigured,

    #[error("Master password is not configured — run setup first")]
    NotConfigured,

    #[error("Invalid master password")]
    InvalidCredentials,

    #[error("Passwords don't match — the current master password is incorrect")]
    PasswordMismatch,

    // --- Crypto errors ---
    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Malformed ciphertext — shorter than the nonce")]
    MalformedCiphertext,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Random number generation failed: {0}")]
    EntropyFailure(String),

    // --- Record errors ---
    #[error("{0} not found")]
    NotFound(String),

    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("{operation}: credential {id}: {source}")]
    Credential {
        operation: &'static str,
        id: i64,
        #[source]
        source: Box<VaultError>,
    },

    // --- Storage errors ---
    #[error("Storage failure in {context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    #[error("Database directory not found: {0}")]
    DatabaseDirMissing(PathBuf),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

impl VaultError {
    /// Wrap a storage error with the name of the operation that hit it.
    pub fn storage(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Attach the id of the credential being processed.
    pub fn for_credential(self, operation: &'static str, id: i64) -> Self {
        Self::Credential {
            operation,
            id,
            source: Box::new(self),
        }
    }

    /// The underlying error with any per-credential context removed.
    pub fn root(&self) -> &VaultError {
        match self {
            Self::Credential { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the store was busy and the same call may succeed later.
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Self::Storage { source, .. } => matches!(
                source.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            _ => false,
        }
    }
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
