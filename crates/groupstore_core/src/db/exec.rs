//! Statement execution over a SQLite connection.

use super::DbResult;
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection};
use std::collections::HashMap;

/// One result row keyed by column name, every value rendered as text.
pub type RowMap = HashMap<String, String>;

/// Executes a mutating statement and returns the number of affected rows.
pub fn execute(conn: &Connection, sql: &str, params: &[Value]) -> DbResult<usize> {
    let changed = conn.execute(sql, params_from_iter(params.iter()))?;
    Ok(changed)
}

/// Runs a query and returns every row as a column-name to text map.
///
/// `NULL` becomes the empty string; numbers use their decimal rendering.
pub fn select_to_map_string(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> DbResult<Vec<RowMap>> {
    let mut stmt = conn.prepare(sql)?;
    let column_names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut mapped = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = RowMap::with_capacity(column_names.len());
        for (index, name) in column_names.iter().enumerate() {
            values.insert(name.clone(), value_to_string(row.get_ref(index)?));
        }
        mapped.push(values);
    }

    Ok(mapped)
}

fn value_to_string(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
