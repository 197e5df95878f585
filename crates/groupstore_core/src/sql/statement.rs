//! Incremental SELECT builder for a single table.

use super::{quote_identifier, CompiledQuery};
use rusqlite::types::Value;

/// Conjunctive SELECT over one table.
///
/// Conditions are rendered in the order they were added and joined with
/// `AND`; their parameters keep the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    table: String,
    conditions: Vec<String>,
    params: Vec<Value>,
    order: Option<(String, bool)>,
    limit: Option<i64>,
    offset: Option<i64>,
    columns: Vec<String>,
}

impl SelectStatement {
    pub fn from_table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            conditions: Vec::new(),
            params: Vec::new(),
            order: None,
            limit: None,
            offset: None,
            columns: Vec::new(),
        }
    }

    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_compare(column, "=", value)
    }

    pub fn where_gt(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_compare(column, ">", value)
    }

    pub fn where_gte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_compare(column, ">=", value)
    }

    pub fn where_lte(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_compare(column, "<=", value)
    }

    /// `column IN (?, ...)`; callers must not pass an empty list.
    pub fn where_in(&mut self, column: &str, values: &[String]) -> &mut Self {
        let placeholders = vec!["?"; values.len()].join(", ");
        self.conditions
            .push(format!("{} IN ({placeholders})", quote_identifier(column)));
        self.params
            .extend(values.iter().map(|value| Value::Text(value.clone())));
        self
    }

    /// Case-insensitive `LIKE` against a caller-built pattern.
    pub fn where_like_ci(&mut self, column: &str, pattern: String) -> &mut Self {
        self.conditions
            .push(format!("LOWER({}) LIKE LOWER(?)", quote_identifier(column)));
        self.params.push(Value::Text(pattern));
        self
    }

    pub fn order_by(&mut self, column: &str, ascending: bool) -> &mut Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn columns(&mut self, columns: &[String]) -> &mut Self {
        self.columns = columns.to_vec();
        self
    }

    /// Row query honoring projection, ordering and pagination.
    pub fn to_select(&self) -> CompiledQuery {
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|column| quote_identifier(column))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {projection} FROM {}", quote_identifier(&self.table));
        let mut params = self.params.clone();
        self.push_where(&mut sql);

        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "ASC" } else { "DESC" };
            sql.push_str(&format!(" ORDER BY {} {direction}", quote_identifier(column)));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                params.push(Value::Integer(limit));
                params.push(Value::Integer(offset));
            }
            (Some(limit), None) => {
                sql.push_str(" LIMIT ?");
                params.push(Value::Integer(limit));
            }
            (None, Some(offset)) => {
                // SQLite only accepts OFFSET after a LIMIT clause.
                sql.push_str(" LIMIT -1 OFFSET ?");
                params.push(Value::Integer(offset));
            }
            (None, None) => {}
        }

        CompiledQuery { sql, params }
    }

    /// Single-row `COUNT(*)` with the same conditions and nothing else.
    pub fn to_count(&self) -> CompiledQuery {
        let mut sql = format!(
            "SELECT COUNT(*) AS \"count\" FROM {}",
            quote_identifier(&self.table)
        );
        self.push_where(&mut sql);

        CompiledQuery {
            sql,
            params: self.params.clone(),
        }
    }

    fn where_compare(&mut self, column: &str, operator: &str, value: &str) -> &mut Self {
        self.conditions
            .push(format!("{} {operator} ?", quote_identifier(column)));
        self.params.push(Value::Text(value.to_string()));
        self
    }

    fn push_where(&self, sql: &mut String) {
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
    }
}
