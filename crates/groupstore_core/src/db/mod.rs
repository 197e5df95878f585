//! SQLite connection bootstrap, schema creation and statement execution.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the group store.
//! - Create the group/relation tables from fixed column definitions.
//! - Execute parameterized statements and return rows as string maps.
//!
//! # Invariants
//! - Every statement is issued with bound parameters; values are never
//!   interpolated into SQL text.
//! - Schema creation is idempotent (`CREATE TABLE IF NOT EXISTS`).

use std::error::Error;
use std::fmt::{Display, Formatter};

mod context;
mod exec;
mod open;
pub mod schema;

pub use context::ExecContext;
pub use exec::{execute, select_to_map_string, RowMap};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Transport-level failure reported by the SQLite layer.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
