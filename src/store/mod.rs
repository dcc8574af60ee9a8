//! Record store: SQLite persistence for credentials and settings.
//!
//! This module provides:
//! - Connection setup, schema and transactions (`database`)
//! - Credential CRUD with transaction-scoped variants (`credentials`)
//! - Setting get/upsert/exists/delete (`settings`)
//!
//! Nothing here knows about keys or encryption.

pub mod credentials;
pub mod database;
pub mod settings;

pub use credentials::{CredentialStore, StoredCredential};
pub use database::{Database, DatabaseOptions};
pub use settings::{Setting, SettingStore};

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as RFC 3339 UTC text without losing precision.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a stored timestamp, reporting the column on failure.
pub(crate) fn parse_timestamp(column: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}
