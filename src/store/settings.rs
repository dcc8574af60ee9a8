//! Key/value application settings.
//!
//! The vault keeps its master-password hash and salt here; other
//! application settings may share the table.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

use super::database::Database;
use super::{format_timestamp, parse_timestamp};
use crate::errors::{Result, VaultError};

/// One row of the `settings` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// CRUD access to the `settings` table.
#[derive(Debug, Clone)]
pub struct SettingStore {
    db: Arc<Database>,
}

impl SettingStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Read a setting value.
    ///
    /// An absent key is `NotFound`, distinct from storage failures, so
    /// callers can tell "not configured" apart from a broken database.
    pub fn get(&self, key: &str) -> Result<String> {
        self.get_setting(key).map(|s| s.value)
    }

    /// Read a full setting row, including its timestamp.
    pub fn get_setting(&self, key: &str) -> Result<Setting> {
        self.db.with_conn(|conn| get_on(conn, key))
    }

    pub fn get_in_tx(&self, tx: &Transaction<'_>, key: &str) -> Result<String> {
        get_on(tx, key).map(|s| s.value)
    }

    /// Insert or replace a setting, refreshing its timestamp.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db.with_conn(|conn| upsert(conn, key, value))
    }

    pub fn set_in_tx(&self, tx: &Transaction<'_>, key: &str, value: &str) -> Result<()> {
        upsert(tx, key, value)
    }

    pub fn exists(&self, key: &str) -> Result<bool> {
        self.db.with_conn(|conn| exists_on(conn, key))
    }

    pub fn exists_in_tx(&self, tx: &Transaction<'_>, key: &str) -> Result<bool> {
        exists_on(tx, key)
    }

    /// Remove a setting.  Returns whether it existed.
    pub fn delete(&self, key: &str) -> Result<bool> {
        self.db.with_conn(|conn| {
            let rows = conn
                .execute("DELETE FROM settings WHERE key = ?1", params![key])
                .map_err(|e| VaultError::storage(format!("SettingStore::delete({key:?})"), e))?;
            Ok(rows > 0)
        })
    }
}

fn get_on(conn: &Connection, key: &str) -> Result<Setting> {
    conn.query_row(
        "SELECT key, value, updated_at FROM settings WHERE key = ?1",
        params![key],
        |row| {
            Ok(Setting {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
            })
        },
    )
    .optional()
    .map_err(|e| VaultError::storage(format!("SettingStore::get({key:?})"), e))?
    .ok_or_else(|| VaultError::NotFound(format!("setting {key:?}")))
}

fn upsert(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, format_timestamp(&Utc::now())],
    )
    .map_err(|e| VaultError::storage(format!("SettingStore::set({key:?})"), e))?;
    Ok(())
}

fn exists_on(conn: &Connection, key: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .map_err(|e| VaultError::storage(format!("SettingStore::exists({key:?})"), e))?;
    Ok(count > 0)
}
