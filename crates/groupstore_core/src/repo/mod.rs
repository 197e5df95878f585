//! Repository layer: group and relation persistence over SQLite.
//!
//! # Responsibility
//! - Compose query specifications, SQL compilation and statement execution
//!   into CRUD, soft-delete, find, list and count operations.
//! - Enforce record-level rules the schema does not (relation triple
//!   uniqueness among active rows, immutable ids).
//!
//! # Invariants
//! - Invalid specifications fail before any SQL is executed.
//! - Find operations report "no match" as `Ok(None)`, never as an error.
//! - Execution errors are returned unchanged; nothing is retried.

use crate::db::DbError;
use crate::query::QueryError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod group_repo;
pub mod relation_repo;
mod store;

pub use group_repo::GroupRepository;
pub use relation_repo::RelationRepository;
pub use store::{SqliteStore, StoreOptions};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by store operations.
#[derive(Debug)]
pub enum RepoError {
    /// A query specification field is set to an unusable value.
    Validation(QueryError),
    /// A record is missing a field required to persist it.
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    /// An argument failed a precondition (empty id, empty handle, ...).
    InvalidArgument(String),
    /// Store options are unusable.
    InvalidOptions(String),
    /// An active relation already links this entity to this group.
    Conflict {
        entity_type: String,
        entity_id: String,
        group_id: String,
    },
    /// No active record with this id.
    NotFound(String),
    Db(DbError),
    /// A result row could not be interpreted.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::MissingField { record, field } => write!(f, "{record} {field} is empty"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::InvalidOptions(message) => write!(f, "invalid store options: {message}"),
            Self::Conflict {
                entity_type,
                entity_id,
                group_id,
            } => write!(
                f,
                "relation already exists for entity {entity_type}/{entity_id} in group {group_id}"
            ),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid result data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::MissingField { .. } => None,
            Self::InvalidArgument(_) => None,
            Self::InvalidOptions(_) => None,
            Self::Conflict { .. } => None,
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Validation(value)
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
