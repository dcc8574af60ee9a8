//! The vault service: master-password lifecycle and encrypted credential CRUD.
//!
//! `VaultService` owns the only copy of the master key.  It is `Locked`
//! while the key is absent and `Unlocked` while it is held; every
//! operation that touches plaintext requires `Unlocked`.
//!
//! Each credential is encrypted with its own key, derived from the master
//! key and a fresh random salt stored alongside the record.  Rotating the
//! master password re-encrypts every record inside a single transaction,
//! so a failure part-way through leaves the database exactly as it was.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{
    decrypt, derive_key, encrypt, generate_salt, hash_password, verify_password, KdfParams,
    MasterKey, SALT_LEN,
};
use crate::errors::{Result, VaultError};
use crate::store::{CredentialStore, Database, SettingStore, StoredCredential};

use super::credential::{Credential, NewCredential};

/// Settings key holding the base64 master-password hash.
pub const MASTER_PASSWORD_HASH_KEY: &str = "master_password_hash";

/// Settings key holding the base64 master-password salt.
pub const MASTER_PASSWORD_SALT_KEY: &str = "master_password_salt";

/// Runtime lock state.  `Some` means unlocked.
#[derive(Default)]
struct VaultState {
    master_key: Option<MasterKey>,
}

impl VaultState {
    fn master_key(&self) -> Result<&MasterKey> {
        self.master_key.as_ref().ok_or(VaultError::Locked)
    }
}

/// Salt and hash of the master password as loaded from settings.
struct MasterPasswordData {
    salt: Vec<u8>,
    hash: Zeroizing<Vec<u8>>,
}

/// Encrypted credential storage guarded by a master password.
///
/// Safe to share between threads.  Reads run concurrently; setup, unlock,
/// lock and rotation take exclusive access to the lock state.
pub struct VaultService {
    db: Arc<Database>,
    credentials: CredentialStore,
    settings: SettingStore,
    kdf_params: KdfParams,
    state: RwLock<VaultState>,
}

impl VaultService {
    // ------------------------------------------------------------------
    // Construction and lock state
    // ------------------------------------------------------------------

    /// Build a locked service over an open database.
    pub fn new(db: Arc<Database>, kdf_params: KdfParams) -> Self {
        Self {
            credentials: CredentialStore::new(Arc::clone(&db)),
            settings: SettingStore::new(Arc::clone(&db)),
            db,
            kdf_params,
            state: RwLock::new(VaultState::default()),
        }
    }

    /// Whether a master password has been configured.
    pub fn is_setup(&self) -> Result<bool> {
        self.settings.exists(MASTER_PASSWORD_HASH_KEY)
    }

    pub fn is_locked(&self) -> bool {
        self.read_state().master_key.is_none()
    }

    /// Configure the master password for the first time and unlock.
    ///
    /// Fails with `AlreadyConfigured` if a hash is already stored; the
    /// existing configuration is never overwritten.
    pub fn setup_master_password(&self, password: &str) -> Result<()> {
        let mut state = self.write_state();

        if self.is_setup()? {
            return Err(VaultError::AlreadyConfigured);
        }

        let salt = generate_salt()?;
        let hash = hash_password(password.as_bytes(), &salt, &self.kdf_params)?;
        let master_key = MasterKey::from_derived(derive_key(
            password.as_bytes(),
            &salt,
            &self.kdf_params,
        )?);

        let encoded_hash = Zeroizing::new(BASE64.encode(hash.as_slice()));
        let encoded_salt = BASE64.encode(salt);

        self.db.transaction("VaultService::setup_master_password", |tx| {
            // Another process may have configured the vault since the check above.
            if self.settings.exists_in_tx(tx, MASTER_PASSWORD_HASH_KEY)? {
                return Err(VaultError::AlreadyConfigured);
            }
            self.settings
                .set_in_tx(tx, MASTER_PASSWORD_HASH_KEY, &encoded_hash)?;
            self.settings
                .set_in_tx(tx, MASTER_PASSWORD_SALT_KEY, &encoded_salt)
        })?;

        state.master_key = Some(master_key);
        info!("master password configured, vault unlocked");
        Ok(())
    }

    /// Verify the master password and, if correct, hold the derived key.
    ///
    /// A wrong password leaves the lock state unchanged.
    pub fn unlock(&self, password: &str) -> Result<()> {
        let mut state = self.write_state();

        let stored = self.load_master_password()?;
        if !verify_password(
            password.as_bytes(),
            &stored.salt,
            &stored.hash,
            &self.kdf_params,
        )? {
            warn!("unlock rejected: invalid master password");
            return Err(VaultError::InvalidCredentials);
        }

        let master_key = MasterKey::from_derived(derive_key(
            password.as_bytes(),
            &stored.salt,
            &self.kdf_params,
        )?);

        if let Some(mut previous) = state.master_key.replace(master_key) {
            previous.zeroize();
        }
        info!("vault unlocked");
        Ok(())
    }

    /// Zero and discard the master key.  Idempotent.
    pub fn lock(&self) {
        let mut state = self.write_state();
        if let Some(mut key) = state.master_key.take() {
            key.zeroize();
            info!("vault locked");
        }
    }

    // ------------------------------------------------------------------
    // Credential operations
    // ------------------------------------------------------------------

    /// Encrypt and persist a new credential, returning its id.
    pub fn store(&self, new: &NewCredential) -> Result<i64> {
        let state = self.read_state();
        let master_key = state.master_key()?;

        let (auth_data, salt) = self.seal_payload(master_key, new.auth_data.as_bytes())?;
        let now = Utc::now();
        let mut record = StoredCredential {
            id: 0,
            provider_id: new.provider_id,
            label: new.label.clone(),
            auth_type: new.auth_type.clone(),
            auth_data,
            salt: salt.to_vec(),
            created_at: now,
            updated_at: now,
        };

        let id = self.credentials.create(&mut record)?;
        debug!(id, provider_id = new.provider_id, "credential stored");
        Ok(id)
    }

    /// Fetch and decrypt one credential.
    pub fn get_by_id(&self, id: i64) -> Result<Credential> {
        let state = self.read_state();
        let master_key = state.master_key()?;

        let record = self.credentials.get_by_id(id)?;
        self.open_record(master_key, record)
            .map_err(|e| e.for_credential("get_by_id", id))
    }

    /// Fetch and decrypt every credential of one provider, in creation order.
    ///
    /// One undecryptable record fails the whole call.
    pub fn get_by_provider_id(&self, provider_id: i64) -> Result<Vec<Credential>> {
        let state = self.read_state();
        let master_key = state.master_key()?;

        let records = self.credentials.get_by_provider_id(provider_id)?;
        self.open_all(master_key, records, "get_by_provider_id")
    }

    /// Fetch and decrypt every credential, in creation order.
    pub fn list(&self) -> Result<Vec<Credential>> {
        let state = self.read_state();
        let master_key = state.master_key()?;

        let records = self.credentials.list()?;
        self.open_all(master_key, records, "list")
    }

    /// Re-encrypt and overwrite an existing credential.
    ///
    /// A fresh salt is drawn on every update.  `created_at` is preserved.
    pub fn update(&self, cred: &Credential) -> Result<()> {
        let state = self.read_state();
        let master_key = state.master_key()?;

        let (auth_data, salt) = self.seal_payload(master_key, cred.auth_data.as_bytes())?;
        let mut record = StoredCredential {
            id: cred.id,
            provider_id: cred.provider_id,
            label: cred.label.clone(),
            auth_type: cred.auth_type.clone(),
            auth_data,
            salt: salt.to_vec(),
            created_at: cred.created_at,
            updated_at: cred.updated_at,
        };

        self.credentials.update(&mut record)?;
        debug!(id = cred.id, "credential updated");
        Ok(())
    }

    /// Delete a credential.  Works whether or not the vault is unlocked.
    pub fn delete(&self, id: i64) -> Result<()> {
        // Shared access keeps deletes out of an in-flight rotation.
        let _state = self.read_state();
        self.credentials.delete(id)?;
        debug!(id, "credential deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Rotation
    // ------------------------------------------------------------------

    /// Replace the master password and re-encrypt every credential.
    ///
    /// All reads, writes and the settings change happen in one
    /// transaction.  On any failure nothing is persisted and both the
    /// stored password and the in-memory lock state are unchanged.
    /// On success the lock state is preserved: an unlocked vault stays
    /// unlocked under the new key, a locked vault stays locked.
    pub fn change_master_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let mut state = self.write_state();

        let stored = self.load_master_password()?;
        if !verify_password(
            old_password.as_bytes(),
            &stored.salt,
            &stored.hash,
            &self.kdf_params,
        )? {
            warn!("master password change rejected: current password incorrect");
            return Err(VaultError::PasswordMismatch);
        }

        let derived_old;
        let old_key = match state.master_key.as_ref() {
            Some(key) => key,
            None => {
                derived_old = MasterKey::from_derived(derive_key(
                    old_password.as_bytes(),
                    &stored.salt,
                    &self.kdf_params,
                )?);
                &derived_old
            }
        };

        let new_salt = generate_salt()?;
        let new_hash = hash_password(new_password.as_bytes(), &new_salt, &self.kdf_params)?;
        let new_key = MasterKey::from_derived(derive_key(
            new_password.as_bytes(),
            &new_salt,
            &self.kdf_params,
        )?);
        let encoded_hash = Zeroizing::new(BASE64.encode(new_hash.as_slice()));
        let encoded_salt = BASE64.encode(new_salt);

        let result = self
            .db
            .transaction("VaultService::change_master_password", |tx| {
                let records = self.credentials.list_in_tx(tx)?;

                let mut plaintexts = Vec::with_capacity(records.len());
                for record in &records {
                    let plaintext = self
                        .open_payload(old_key, record)
                        .map_err(|e| e.for_credential("change_master_password", record.id))?;
                    plaintexts.push((record.id, plaintext));
                }

                self.settings
                    .set_in_tx(tx, MASTER_PASSWORD_HASH_KEY, &encoded_hash)?;
                self.settings
                    .set_in_tx(tx, MASTER_PASSWORD_SALT_KEY, &encoded_salt)?;

                for (id, plaintext) in &plaintexts {
                    let (auth_data, salt) = self
                        .seal_payload(&new_key, plaintext)
                        .map_err(|e| e.for_credential("change_master_password", *id))?;
                    self.credentials
                        .update_encrypted_in_tx(tx, *id, &auth_data, &salt)
                        .map_err(|e| e.for_credential("change_master_password", *id))?;
                }

                Ok(plaintexts.len())
            });

        let rotated = match result {
            Ok(count) => count,
            Err(err) => {
                warn!(error = %err, "master password change rolled back");
                return Err(err);
            }
        };

        if state.master_key.is_some() {
            if let Some(mut previous) = state.master_key.replace(new_key) {
                previous.zeroize();
            }
        }
        // A locked vault stays locked; `new_key` zeroes itself on drop.

        info!(records = rotated, "master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal helpers
    // ------------------------------------------------------------------

    fn read_state(&self) -> RwLockReadGuard<'_, VaultState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, VaultState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn load_master_password(&self) -> Result<MasterPasswordData> {
        let hash = match self.settings.get(MASTER_PASSWORD_HASH_KEY) {
            Ok(value) => Zeroizing::new(value),
            Err(VaultError::NotFound(_)) => return Err(VaultError::NotConfigured),
            Err(e) => return Err(e),
        };
        let salt = match self.settings.get(MASTER_PASSWORD_SALT_KEY) {
            Ok(value) => value,
            Err(VaultError::NotFound(_)) => return Err(VaultError::NotConfigured),
            Err(e) => return Err(e),
        };

        let hash = BASE64
            .decode(hash.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| VaultError::CorruptRecord(format!("stored master password hash: {e}")))?;
        let salt = BASE64
            .decode(salt.as_bytes())
            .map_err(|e| VaultError::CorruptRecord(format!("stored master password salt: {e}")))?;

        Ok(MasterPasswordData { salt, hash })
    }

    /// Encrypt a payload under a fresh per-record key.
    ///
    /// Returns the base64 ciphertext and the salt it was derived with.
    fn seal_payload(
        &self,
        master_key: &MasterKey,
        plaintext: &[u8],
    ) -> Result<(String, [u8; SALT_LEN])> {
        let salt = generate_salt()?;
        let record_key = master_key.derive_record_key(&salt, &self.kdf_params)?;
        let ciphertext = encrypt(record_key.as_slice(), plaintext)?;
        Ok((BASE64.encode(ciphertext), salt))
    }

    fn open_payload(
        &self,
        master_key: &MasterKey,
        record: &StoredCredential,
    ) -> Result<Zeroizing<Vec<u8>>> {
        if record.salt.len() != SALT_LEN {
            return Err(VaultError::CorruptRecord(format!(
                "salt is {} bytes, expected {SALT_LEN}",
                record.salt.len()
            )));
        }
        let ciphertext = BASE64
            .decode(record.auth_data.as_bytes())
            .map_err(|e| VaultError::CorruptRecord(format!("auth_data is not valid base64: {e}")))?;

        let record_key = master_key.derive_record_key(&record.salt, &self.kdf_params)?;
        let plaintext = decrypt(record_key.as_slice(), &ciphertext)?;
        Ok(Zeroizing::new(plaintext))
    }

    fn open_record(&self, master_key: &MasterKey, record: StoredCredential) -> Result<Credential> {
        let mut plaintext = self.open_payload(master_key, &record)?;
        let bytes = std::mem::take(&mut *plaintext);
        let auth_data = String::from_utf8(bytes).map_err(|e| {
            let mut bytes = e.into_bytes();
            bytes.zeroize();
            VaultError::CorruptRecord("decrypted payload is not valid UTF-8".into())
        })?;

        Ok(Credential {
            id: record.id,
            provider_id: record.provider_id,
            label: record.label,
            auth_type: record.auth_type,
            auth_data,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    fn open_all(
        &self,
        master_key: &MasterKey,
        records: Vec<StoredCredential>,
        operation: &'static str,
    ) -> Result<Vec<Credential>> {
        let mut creds = Vec::with_capacity(records.len());
        for record in records {
            let id = record.id;
            creds.push(
                self.open_record(master_key, record)
                    .map_err(|e| e.for_credential(operation, id))?,
            );
        }
        Ok(creds)
    }
}

impl Drop for VaultService {
    fn drop(&mut self) {
        self.lock();
    }
}

impl std::fmt::Debug for VaultService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultService")
            .field("locked", &self.is_locked())
            .field("kdf_params", &self.kdf_params)
            .finish_non_exhaustive()
    }
}
