//! Fixed table definitions for the group and relation tables.
//!
//! # Invariants
//! - Column order here is the column order of the created table.
//! - Table names are supplied at runtime, so DDL is rendered on demand
//!   instead of shipped as static migration files.

use crate::sql::quote_identifier;

pub const COLUMN_CREATED_AT: &str = "created_at";
pub const COLUMN_ENTITY_ID: &str = "entity_id";
pub const COLUMN_ENTITY_TYPE: &str = "entity_type";
pub const COLUMN_GROUP_ID: &str = "group_id";
pub const COLUMN_HANDLE: &str = "handle";
pub const COLUMN_ID: &str = "id";
pub const COLUMN_MEMO: &str = "memo";
pub const COLUMN_METAS: &str = "metas";
pub const COLUMN_SOFT_DELETED_AT: &str = "soft_deleted_at";
pub const COLUMN_STATUS: &str = "status";
pub const COLUMN_TITLE: &str = "title";
pub const COLUMN_UPDATED_AT: &str = "updated_at";

/// Storage class of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Bounded string, rendered as `VARCHAR(length)`.
    String,
    /// Unbounded text.
    Text,
    /// Timestamp in the clock's fixed text format.
    DateTime,
}

/// One column of a fixed table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: &'static str,
    pub kind: ColumnType,
    /// Only meaningful for `ColumnType::String`.
    pub length: u32,
    pub primary_key: bool,
}

const fn column(name: &'static str, kind: ColumnType, length: u32) -> ColumnDefinition {
    ColumnDefinition {
        name,
        kind,
        length,
        primary_key: false,
    }
}

const fn primary_key(name: &'static str, length: u32) -> ColumnDefinition {
    ColumnDefinition {
        name,
        kind: ColumnType::String,
        length,
        primary_key: true,
    }
}

pub const GROUP_COLUMNS: &[ColumnDefinition] = &[
    primary_key(COLUMN_ID, 40),
    column(COLUMN_STATUS, ColumnType::String, 40),
    column(COLUMN_HANDLE, ColumnType::String, 50),
    column(COLUMN_TITLE, ColumnType::String, 100),
    column(COLUMN_METAS, ColumnType::Text, 0),
    column(COLUMN_MEMO, ColumnType::Text, 0),
    column(COLUMN_CREATED_AT, ColumnType::DateTime, 0),
    column(COLUMN_UPDATED_AT, ColumnType::DateTime, 0),
    column(COLUMN_SOFT_DELETED_AT, ColumnType::DateTime, 0),
];

pub const RELATION_COLUMNS: &[ColumnDefinition] = &[
    primary_key(COLUMN_ID, 40),
    column(COLUMN_ENTITY_TYPE, ColumnType::String, 80),
    column(COLUMN_ENTITY_ID, ColumnType::String, 40),
    column(COLUMN_GROUP_ID, ColumnType::String, 40),
    column(COLUMN_METAS, ColumnType::Text, 0),
    column(COLUMN_MEMO, ColumnType::Text, 0),
    column(COLUMN_CREATED_AT, ColumnType::DateTime, 0),
    column(COLUMN_UPDATED_AT, ColumnType::DateTime, 0),
    column(COLUMN_SOFT_DELETED_AT, ColumnType::DateTime, 0),
];

/// Renders `CREATE TABLE IF NOT EXISTS` for `table` with `columns`.
pub fn create_table_sql(table: &str, columns: &[ColumnDefinition]) -> String {
    let rendered: Vec<String> = columns.iter().map(render_column).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({});",
        quote_identifier(table),
        rendered.join(", ")
    )
}

/// Renders the non-unique lookup index over the relation triple.
///
/// Triple uniqueness among active rows is checked by the store before insert,
/// so this index only speeds up that lookup.
pub fn relation_lookup_index_sql(table: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({}, {}, {});",
        quote_identifier(&format!("idx_{table}_entity_group")),
        quote_identifier(table),
        quote_identifier(COLUMN_ENTITY_TYPE),
        quote_identifier(COLUMN_ENTITY_ID),
        quote_identifier(COLUMN_GROUP_ID),
    )
}

fn render_column(column: &ColumnDefinition) -> String {
    let sql_type = match column.kind {
        ColumnType::String => format!("VARCHAR({})", column.length),
        ColumnType::Text => "TEXT".to_string(),
        ColumnType::DateTime => "DATETIME".to_string(),
    };

    let mut rendered = format!("{} {sql_type}", quote_identifier(column.name));
    if column.primary_key {
        rendered.push_str(" PRIMARY KEY");
    }
    rendered.push_str(" NOT NULL");
    rendered
}
