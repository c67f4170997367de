//! SQLite bootstrap for the `kv_entries` table backing the topic store.
//!
//! Connections come out of [`open_db`] or [`open_db_in_memory`] already
//! migrated; `PRAGMA user_version` records the applied schema version.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or upgrading the library database.
#[derive(Debug)]
pub enum DbError {
    /// Connection or pragma failure outside any migration step.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build; nothing was changed.
    SchemaTooNew { found: u32, supported: u32 },
    /// A migration script failed and its batch was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "library schema v{found} needs a newer build (this one reads up to v{supported})"
            ),
            Self::Migration { version, source } => {
                write!(f, "migration v{version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
