//! Optional-field query specifications for group and relation listing.
//!
//! # Responsibility
//! - Hold filter, sort, pagination and projection intent per entity kind.
//! - Track presence per field so "unset" differs from "set to empty".
//! - Validate set fields before any SQL is compiled.
//!
//! # Invariants
//! - Value accessors never fail; an absent field reads as its zero value.
//! - A present field holding an empty string, an empty list, a limit below 1
//!   or a negative offset is a validation error.
//! - Sort and projection columns must name columns of the entity's table.

use crate::db::schema::ColumnDefinition;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod group_query;
pub mod relation_query;

pub use group_query::GroupQuery;
pub use relation_query::RelationQuery;

/// Ascending sort token, matched case-insensitively.
pub const SORT_ASC: &str = "asc";
/// Descending sort token; the default when a sort column is set.
pub const SORT_DESC: &str = "desc";

pub type QueryResult<T> = Result<T, QueryError>;

/// A set field of a query specification holds an unusable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// Which specification produced the error (`group` or `relation`).
    pub query: &'static str,
    /// Offending field name, e.g. `id_in`.
    pub field: &'static str,
    pub reason: &'static str,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} query: {} {}", self.query, self.field, self.reason)
    }
}

impl Error for QueryError {}

const REASON_EMPTY_STRING: &str = "cannot be empty";
const REASON_EMPTY_LIST: &str = "cannot be an empty list";
const REASON_LIMIT: &str = "must be greater than 0";
const REASON_OFFSET: &str = "must be greater than or equal to 0";
const REASON_UNKNOWN_COLUMN: &str = "unknown column";

pub(crate) fn check_string(
    query: &'static str,
    field: &'static str,
    value: Option<&String>,
) -> QueryResult<()> {
    match value {
        Some(value) if value.is_empty() => Err(QueryError {
            query,
            field,
            reason: REASON_EMPTY_STRING,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_list(
    query: &'static str,
    field: &'static str,
    value: Option<&Vec<String>>,
) -> QueryResult<()> {
    match value {
        Some(values) if values.is_empty() => Err(QueryError {
            query,
            field,
            reason: REASON_EMPTY_LIST,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_limit(query: &'static str, limit: Option<i64>) -> QueryResult<()> {
    match limit {
        Some(limit) if limit <= 0 => Err(QueryError {
            query,
            field: "limit",
            reason: REASON_LIMIT,
        }),
        _ => Ok(()),
    }
}

pub(crate) fn check_offset(query: &'static str, offset: Option<i64>) -> QueryResult<()> {
    match offset {
        Some(offset) if offset < 0 => Err(QueryError {
            query,
            field: "offset",
            reason: REASON_OFFSET,
        }),
        _ => Ok(()),
    }
}

/// Rejects a set column name that is not one of `known`.
pub(crate) fn check_column(
    query: &'static str,
    field: &'static str,
    value: Option<&String>,
    known: &[ColumnDefinition],
) -> QueryResult<()> {
    check_string(query, field, value)?;
    match value {
        Some(name) if !is_known_column(name, known) => Err(QueryError {
            query,
            field,
            reason: REASON_UNKNOWN_COLUMN,
        }),
        _ => Ok(()),
    }
}

/// Rejects an empty column list or one naming a column not in `known`.
pub(crate) fn check_columns(
    query: &'static str,
    field: &'static str,
    value: Option<&Vec<String>>,
    known: &[ColumnDefinition],
) -> QueryResult<()> {
    check_list(query, field, value)?;
    let unknown = value
        .into_iter()
        .flatten()
        .any(|name| !is_known_column(name, known));
    if unknown {
        return Err(QueryError {
            query,
            field,
            reason: REASON_UNKNOWN_COLUMN,
        });
    }
    Ok(())
}

fn is_known_column(name: &str, known: &[ColumnDefinition]) -> bool {
    known.iter().any(|column| column.name == name)
}
