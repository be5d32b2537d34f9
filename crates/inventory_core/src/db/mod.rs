//! SQLite storage bootstrap and schema lifecycle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the item store.
//! - Apply schema migrations in deterministic order.
//! - Decide what happens when the on-disk schema is ahead of this binary.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No item data is read or written before migrations succeed.
//! - A destructive rebuild only ever happens under an explicit
//!   [`SchemaMismatchPolicy::Rebuild`] opt-in, and is logged.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Policy applied when the on-disk `user_version` is ahead of the latest
/// migration this binary knows, i.e. there is no forward migration path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaMismatchPolicy {
    /// Fail the open with [`DbError::SchemaVersionAhead`].
    #[default]
    Reject,
    /// Delete the database file and start empty. Destroys all item data.
    Rebuild,
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    SchemaVersionAhead {
        db_version: u32,
        latest_supported: u32,
    },
    Rebuild(std::io::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaVersionAhead {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is ahead of supported {latest_supported}"
            ),
            Self::Rebuild(err) => write!(f, "failed to remove store file for rebuild: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaVersionAhead { .. } => None,
            Self::Rebuild(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
