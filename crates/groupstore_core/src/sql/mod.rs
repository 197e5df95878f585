//! Parameterized SQL rendering.
//!
//! # Responsibility
//! - Render SELECT / COUNT / INSERT / UPDATE / DELETE statements for one table.
//! - Compile validated query specifications into those statements.
//!
//! # Invariants
//! - Filter and row values only ever travel as bound parameters.
//! - Identifiers (tables, columns) are always double-quoted.
//! - Parameters appear in the same order as their placeholders.

use rusqlite::types::Value;

mod compiler;
mod statement;

pub use compiler::{compile_group_query, compile_relation_query};
pub use statement::SelectStatement;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Quotes one identifier for SQLite, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders a full-row insert.
pub fn insert_sql(table: &str, row: &[(&'static str, String)]) -> CompiledQuery {
    let columns: Vec<String> = row.iter().map(|(name, _)| quote_identifier(name)).collect();
    let placeholders = vec!["?"; row.len()].join(", ");

    CompiledQuery {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            quote_identifier(table),
            columns.join(", ")
        ),
        params: row
            .iter()
            .map(|(_, value)| Value::Text(value.clone()))
            .collect(),
    }
}

/// Renders a partial update of `changes` on the row with `id_column = id`.
pub fn update_sql(
    table: &str,
    changes: &[(&'static str, String)],
    id_column: &str,
    id: &str,
) -> CompiledQuery {
    let assignments: Vec<String> = changes
        .iter()
        .map(|(name, _)| format!("{} = ?", quote_identifier(name)))
        .collect();
    let mut params: Vec<Value> = changes
        .iter()
        .map(|(_, value)| Value::Text(value.clone()))
        .collect();
    params.push(Value::Text(id.to_string()));

    CompiledQuery {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_identifier(table),
            assignments.join(", "),
            quote_identifier(id_column)
        ),
        params,
    }
}

/// Renders a hard delete of the row with `id_column = id`.
pub fn delete_sql(table: &str, id_column: &str, id: &str) -> CompiledQuery {
    CompiledQuery {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_identifier(table),
            quote_identifier(id_column)
        ),
        params: vec![Value::Text(id.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::{delete_sql, insert_sql, quote_identifier, update_sql};
    use rusqlite::types::Value;

    #[test]
    fn quote_identifier_escapes_embedded_quotes() {
        assert_eq!(quote_identifier("title"), "\"title\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn insert_binds_every_value() {
        let compiled = insert_sql(
            "groups",
            &[("id", "G1".to_string()), ("title", "Admins".to_string())],
        );

        assert_eq!(
            compiled.sql,
            "INSERT INTO \"groups\" (\"id\", \"title\") VALUES (?, ?)"
        );
        assert_eq!(
            compiled.params,
            vec![
                Value::Text("G1".to_string()),
                Value::Text("Admins".to_string())
            ]
        );
    }

    #[test]
    fn update_binds_id_last() {
        let compiled = update_sql(
            "groups",
            &[
                ("title", "New".to_string()),
                ("updated_at", "2024-01-01 00:00:00".to_string()),
            ],
            "id",
            "G1",
        );

        assert_eq!(
            compiled.sql,
            "UPDATE \"groups\" SET \"title\" = ?, \"updated_at\" = ? WHERE \"id\" = ?"
        );
        assert_eq!(compiled.params.last(), Some(&Value::Text("G1".to_string())));
    }

    #[test]
    fn delete_targets_single_id() {
        let compiled = delete_sql("relations", "id", "R1");
        assert_eq!(compiled.sql, "DELETE FROM \"relations\" WHERE \"id\" = ?");
        assert_eq!(compiled.params, vec![Value::Text("R1".to_string())]);
    }
}
