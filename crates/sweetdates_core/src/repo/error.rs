//! Error taxonomy shared by the record store and repositories.

use crate::db::DbError;
use crate::model::memory::{MemoryId, MemoryValidationError};
use crate::model::setting::SettingValidationError;
use crate::store::Collection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by store, repository and service operations.
#[derive(Debug)]
pub enum RepoError {
    /// Device storage could not be opened, migrated or reset.
    StoreUnavailable(DbError),
    /// Memory input was rejected before any write.
    Validation(MemoryValidationError),
    /// Setting input was rejected before any write.
    InvalidSetting(SettingValidationError),
    /// A lookup that requires an existing memory found none.
    NotFound(MemoryId),
    /// A multi-collection transaction was aborted; nothing was committed.
    TransactionFailure {
        scope: Vec<Collection>,
        source: DbError,
    },
    /// A transaction body touched a collection it did not declare.
    CollectionOutOfScope(Collection),
    InvalidData(String),
    InconsistentState(&'static str),
    Db(DbError),
}

impl RepoError {
    /// Whether the caller can fix the input and retry.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidSetting(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreUnavailable(err) => write!(f, "record store unavailable: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidSetting(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "memory not found: {id}"),
            Self::TransactionFailure { scope, source } => {
                let names: Vec<&str> = scope.iter().map(|c| c.table_name()).collect();
                write!(
                    f,
                    "transaction over [{}] aborted: {source}",
                    names.join(", ")
                )
            }
            Self::CollectionOutOfScope(collection) => write!(
                f,
                "collection `{}` is not part of this transaction",
                collection.table_name()
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::InconsistentState(details) => write!(f, "inconsistent store state: {details}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreUnavailable(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidSetting(err) => Some(err),
            Self::TransactionFailure { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::CollectionOutOfScope(_)
            | Self::InvalidData(_)
            | Self::InconsistentState(_) => None,
        }
    }
}

impl From<MemoryValidationError> for RepoError {
    fn from(value: MemoryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SettingValidationError> for RepoError {
    fn from(value: SettingValidationError) -> Self {
        Self::InvalidSetting(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
