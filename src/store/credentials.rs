//! Credential persistence.
//!
//! `CredentialStore` is plain CRUD over the `credentials` table: it never
//! sees a key and never decrypts.  `auth_data` arrives already encrypted
//! and text-encoded; `salt` is the per-record KDF salt.
//!
//! Every mutating operation has an `_in_tx` twin that runs inside a
//! transaction supplied by the caller, for the master-password rotation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use super::database::Database;
use super::{format_timestamp, parse_timestamp};
use crate::errors::{Result, VaultError};

/// A credential row exactly as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    pub id: i64,
    pub provider_id: i64,
    pub label: String,
    pub auth_type: String,
    /// Base64 of `nonce || ciphertext || tag`, never plaintext.
    pub auth_data: String,
    pub salt: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SELECT_COLUMNS: &str =
    "SELECT id, provider_id, label, auth_type, auth_data, salt, created_at, updated_at
     FROM credentials";

/// CRUD access to the `credentials` table.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    db: Arc<Database>,
}

impl CredentialStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new record, assigning its id and both timestamps.
    pub fn create(&self, cred: &mut StoredCredential) -> Result<i64> {
        self.db.with_conn(|conn| insert(conn, cred))
    }

    pub fn create_in_tx(&self, tx: &Transaction<'_>, cred: &mut StoredCredential) -> Result<i64> {
        insert(tx, cred)
    }

    /// Fetch one record; `NotFound` if the id does not exist.
    pub fn get_by_id(&self, id: i64) -> Result<StoredCredential> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                row_to_credential,
            )
            .optional()
            .map_err(|e| VaultError::storage(format!("CredentialStore::get_by_id({id})"), e))?
            .ok_or_else(|| VaultError::NotFound(format!("credential {id}")))
        })
    }

    /// All records owned by one provider, in creation order.
    pub fn get_by_provider_id(&self, provider_id: i64) -> Result<Vec<StoredCredential>> {
        self.db.with_conn(|conn| {
            query_all(
                conn,
                &format!("{SELECT_COLUMNS} WHERE provider_id = ?1 ORDER BY id"),
                params![provider_id],
                &format!("CredentialStore::get_by_provider_id({provider_id})"),
            )
        })
    }

    /// Every record, in creation order.
    pub fn list(&self) -> Result<Vec<StoredCredential>> {
        self.db.with_conn(list_on)
    }

    pub fn list_in_tx(&self, tx: &Transaction<'_>) -> Result<Vec<StoredCredential>> {
        list_on(tx)
    }

    /// Overwrite the mutable fields of an existing record.
    ///
    /// Refreshes `updated_at` on `cred`; `created_at` is left untouched.
    pub fn update(&self, cred: &mut StoredCredential) -> Result<()> {
        self.db.with_conn(|conn| update_on(conn, cred))
    }

    pub fn update_in_tx(&self, tx: &Transaction<'_>, cred: &mut StoredCredential) -> Result<()> {
        update_on(tx, cred)
    }

    /// Replace only the ciphertext and salt of one record.
    pub fn update_encrypted_in_tx(
        &self,
        tx: &Transaction<'_>,
        id: i64,
        auth_data: &str,
        salt: &[u8],
    ) -> Result<()> {
        let now = Utc::now();
        let rows = tx
            .execute(
                "UPDATE credentials SET auth_data = ?1, salt = ?2, updated_at = ?3 WHERE id = ?4",
                params![auth_data, salt, format_timestamp(&now), id],
            )
            .map_err(|e| {
                VaultError::storage(format!("CredentialStore::update_encrypted_in_tx({id})"), e)
            })?;
        if rows == 0 {
            return Err(VaultError::NotFound(format!("credential {id}")));
        }
        Ok(())
    }

    /// Remove a record; `NotFound` if the id does not exist.
    pub fn delete(&self, id: i64) -> Result<()> {
        self.db.with_conn(|conn| delete_on(conn, id))
    }

    pub fn delete_in_tx(&self, tx: &Transaction<'_>, id: i64) -> Result<()> {
        delete_on(tx, id)
    }
}

// ---------------------------------------------------------------------------
// Statements shared by the plain and in-transaction variants
// ---------------------------------------------------------------------------

fn insert(conn: &Connection, cred: &mut StoredCredential) -> Result<i64> {
    let now = Utc::now();
    let ts = format_timestamp(&now);
    conn.execute(
        "INSERT INTO credentials
            (provider_id, label, auth_type, auth_data, salt, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            cred.provider_id,
            cred.label,
            cred.auth_type,
            cred.auth_data,
            cred.salt,
            ts,
            ts
        ],
    )
    .map_err(|e| VaultError::storage("CredentialStore::create", e))?;

    cred.id = conn.last_insert_rowid();
    cred.created_at = now;
    cred.updated_at = now;
    Ok(cred.id)
}

fn list_on(conn: &Connection) -> Result<Vec<StoredCredential>> {
    query_all(
        conn,
        &format!("{SELECT_COLUMNS} ORDER BY id"),
        params![],
        "CredentialStore::list",
    )
}

fn update_on(conn: &Connection, cred: &mut StoredCredential) -> Result<()> {
    let now = Utc::now();
    let id = cred.id;
    let rows = conn
        .execute(
            "UPDATE credentials
             SET provider_id = ?1, label = ?2, auth_type = ?3, auth_data = ?4,
                 salt = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                cred.provider_id,
                cred.label,
                cred.auth_type,
                cred.auth_data,
                cred.salt,
                format_timestamp(&now),
                id
            ],
        )
        .map_err(|e| VaultError::storage(format!("CredentialStore::update({id})"), e))?;

    if rows == 0 {
        return Err(VaultError::NotFound(format!("credential {id}")));
    }
    cred.updated_at = now;
    Ok(())
}

fn delete_on(conn: &Connection, id: i64) -> Result<()> {
    let rows = conn
        .execute("DELETE FROM credentials WHERE id = ?1", params![id])
        .map_err(|e| VaultError::storage(format!("CredentialStore::delete({id})"), e))?;
    if rows == 0 {
        return Err(VaultError::NotFound(format!("credential {id}")));
    }
    Ok(())
}

fn query_all<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
    context: &str,
) -> Result<Vec<StoredCredential>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| VaultError::storage(context, e))?;
    let rows = stmt
        .query_map(params, row_to_credential)
        .map_err(|e| VaultError::storage(context, e))?;

    let mut creds = Vec::new();
    for row in rows {
        creds.push(row.map_err(|e| VaultError::storage(format!("{context}: scan"), e))?);
    }
    Ok(creds)
}

fn row_to_credential(row: &Row<'_>) -> rusqlite::Result<StoredCredential> {
    Ok(StoredCredential {
        id: row.get(0)?,
        provider_id: row.get(1)?,
        label: row.get(2)?,
        auth_type: row.get(3)?,
        auth_data: row.get(4)?,
        salt: row.get(5)?,
        created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
    })
}
