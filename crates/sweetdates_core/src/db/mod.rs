//! Database bootstrap for the record store.
//!
//! # Responsibility
//! - Open the file or in-memory database behind `settings`, `dates` and `photos`.
//! - Own the migration catalog that `RecordStore::reset` tears down and rebuilds.
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`; zero means "no schema".
//! - A database written by a newer build is refused, never downgraded.
//! - Every `DbError` raised while opening or resetting reaches callers as
//!   `RepoError::StoreUnavailable`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, migrating or resetting the database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was last migrated by a newer build.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable `error_code` value for log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::UnsupportedSchemaVersion { .. } => "schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;

    #[test]
    fn codes_distinguish_schema_and_sqlite_failures() {
        let newer = DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1,
        };
        assert_eq!(newer.code(), "schema_too_new");
        assert!(newer.to_string().contains("newer than supported 1"));

        let sqlite = DbError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(sqlite.code(), "sqlite");
    }
}
