//! SQLite connection management.
//!
//! One `rusqlite::Connection` per process, guarded by a mutex so writes
//! are serialized.  Opening applies WAL mode, foreign keys and a busy
//! timeout, then creates the schema if it is missing.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, warn};

use crate::errors::{Result, VaultError};

/// Connection-level options, usually built from `Settings`.
#[derive(Debug, Clone, Copy)]
pub struct DatabaseOptions {
    /// How long a statement waits on a locked database before failing
    /// with a retryable storage error.
    pub busy_timeout: Duration,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5_000),
        }
    }
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS credentials (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        provider_id INTEGER NOT NULL,
        label       TEXT NOT NULL,
        auth_type   TEXT NOT NULL,
        auth_data   TEXT NOT NULL,
        salt        BLOB NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_credentials_provider_id
        ON credentials (provider_id);

    CREATE TABLE IF NOT EXISTS settings (
        key        TEXT PRIMARY KEY,
        value      TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
";

/// The durable store shared by `CredentialStore` and `SettingStore`.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path, options: &DatabaseOptions) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(VaultError::DatabaseDirMissing(parent.to_path_buf()));
            }
        }

        let conn =
            Connection::open(path).map_err(|e| VaultError::storage("Database::open", e))?;

        // Owner-only access to the database file.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        let db = Self::init(conn, options)?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open a private in-memory database (tests and throwaway sessions).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| VaultError::storage("Database::open_in_memory", e))?;
        Self::init(conn, &DatabaseOptions::default())
    }

    fn init(conn: Connection, options: &DatabaseOptions) -> Result<Self> {
        let pragma = |e: rusqlite::Error| VaultError::storage("Database::init: pragmas", e);

        // In-memory databases report "memory" here; that is fine.
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(pragma)?;
        conn.pragma_update(None, "foreign_keys", true).map_err(pragma)?;
        conn.busy_timeout(options.busy_timeout).map_err(pragma)?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| VaultError::storage("Database::init: schema", e))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` against the shared connection outside any transaction.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.lock_conn();
        f(&conn)
    }

    /// Run `f` inside one write transaction.
    ///
    /// Commits when `f` returns `Ok`.  Any error rolls the transaction
    /// back before it is returned, so none of `f`'s writes persist.
    pub fn transaction<T>(
        &self,
        context: &str,
        f: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.lock_conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| VaultError::storage(format!("{context}: begin"), e))?;

        match f(&tx) {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| VaultError::storage(format!("{context}: commit"), e))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(%context, error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }

    // A panic while holding the guard cannot leave the connection itself
    // in a torn state, so a poisoned lock is still usable.
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
