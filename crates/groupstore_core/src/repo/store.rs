//! SQLite-backed store: configuration, schema bootstrap and the shared
//! write/read plumbing used by the group and relation repositories.

use super::{RepoError, RepoResult};
use crate::clock::{format_datetime, Clock, SystemClock};
use crate::db::schema::{
    create_table_sql, relation_lookup_index_sql, COLUMN_ID, GROUP_COLUMNS, RELATION_COLUMNS,
};
use crate::db::{self, ExecContext, RowMap};
use crate::logging::sanitize_message;
use crate::model::record::Record;
use crate::sql::{delete_sql, insert_sql, update_sql, CompiledQuery};
use chrono::NaiveDateTime;
use log::{debug, error, info};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

const MAX_LOGGED_SQL_CHARS: usize = 2_000;
const MAX_LOGGED_PARAMS_CHARS: usize = 500;

/// Store configuration, fixed at construction.
///
/// Deserializable so it can come straight from a JSON config file; missing
/// fields fall back to `Default`, which leaves table names empty and is
/// rejected by `validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    pub group_table_name: String,
    pub relation_table_name: String,
    /// Create missing tables when the store is constructed.
    pub automigrate_enabled: bool,
    /// Log every statement at debug level.
    pub debug_enabled: bool,
}

impl StoreOptions {
    pub fn new(group_table_name: impl Into<String>, relation_table_name: impl Into<String>) -> Self {
        Self {
            group_table_name: group_table_name.into(),
            relation_table_name: relation_table_name.into(),
            automigrate_enabled: false,
            debug_enabled: false,
        }
    }

    pub fn with_automigrate(mut self, enabled: bool) -> Self {
        self.automigrate_enabled = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_enabled = enabled;
        self
    }

    pub fn validate(&self) -> RepoResult<()> {
        if self.group_table_name.trim().is_empty() {
            return Err(RepoError::InvalidOptions(
                "group_table_name is required".to_string(),
            ));
        }
        if self.relation_table_name.trim().is_empty() {
            return Err(RepoError::InvalidOptions(
                "relation_table_name is required".to_string(),
            ));
        }
        if self.group_table_name == self.relation_table_name {
            return Err(RepoError::InvalidOptions(format!(
                "group and relation tables must differ, both are `{}`",
                self.group_table_name
            )));
        }
        Ok(())
    }
}

/// Group and relation store over one default SQLite connection.
///
/// Every operation takes an [`ExecContext`]; passing one built from an open
/// transaction runs that call's statements inside the transaction.
pub struct SqliteStore<'conn> {
    conn: &'conn Connection,
    options: StoreOptions,
    clock: Arc<dyn Clock>,
}

impl<'conn> SqliteStore<'conn> {
    /// Builds a store using the system clock.
    ///
    /// # Errors
    /// - `InvalidOptions` when table names are missing or clash.
    /// - `Db` when automigration is enabled and table creation fails.
    pub fn new(conn: &'conn Connection, options: StoreOptions) -> RepoResult<Self> {
        Self::with_clock(conn, options, Arc::new(SystemClock))
    }

    /// Builds a store that stamps and filters using `clock`.
    pub fn with_clock(
        conn: &'conn Connection,
        options: StoreOptions,
        clock: Arc<dyn Clock>,
    ) -> RepoResult<Self> {
        options.validate()?;

        let store = Self {
            conn,
            options,
            clock,
        };

        if store.options.automigrate_enabled {
            store.auto_migrate()?;
        }

        Ok(store)
    }

    /// Creates the group and relation tables when absent.
    ///
    /// # Side effects
    /// - Emits `auto_migrate` logging events with duration and status.
    pub fn auto_migrate(&self) -> RepoResult<()> {
        let started_at = Instant::now();
        info!(
            "event=auto_migrate module=repo status=start group_table={} relation_table={}",
            self.options.group_table_name, self.options.relation_table_name
        );

        let statements = [
            create_table_sql(&self.options.group_table_name, GROUP_COLUMNS),
            create_table_sql(&self.options.relation_table_name, RELATION_COLUMNS),
            relation_lookup_index_sql(&self.options.relation_table_name),
        ];

        for statement in &statements {
            if let Err(err) = self.conn.execute_batch(statement) {
                error!(
                    "event=auto_migrate module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err.into());
            }
        }

        info!(
            "event=auto_migrate module=repo status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Default connection used when a call carries no transaction.
    pub fn db(&self) -> &'conn Connection {
        self.conn
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Turns statement logging on or off.
    pub fn enable_debug(&mut self, debug: bool) {
        self.options.debug_enabled = debug;
    }

    pub(crate) fn group_table(&self) -> &str {
        &self.options.group_table_name
    }

    pub(crate) fn relation_table(&self) -> &str {
        &self.options.relation_table_name
    }

    /// Current instant by the store's clock.
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Whether `record` is soft-deleted by the store's clock right now,
    /// using the rule the list and find visibility predicate applies.
    pub fn is_soft_deleted<R: Record>(&self, record: &R) -> bool {
        record.is_soft_deleted_at(self.now())
    }

    /// Runs a compiled row query and hydrates each row, stamping every
    /// record with the instant the visibility predicate was compiled for.
    pub(crate) fn list_records<R: Record>(
        &self,
        ctx: ExecContext<'_>,
        compiled: &CompiledQuery,
        observed_at: NaiveDateTime,
        from_row: fn(&RowMap) -> R,
    ) -> RepoResult<Vec<R>> {
        let rows = self.select(ctx, compiled)?;
        Ok(rows
            .iter()
            .map(|row| {
                let mut record = from_row(row);
                record.set_observed_at(observed_at);
                record
            })
            .collect())
    }

    pub(crate) fn select(
        &self,
        ctx: ExecContext<'_>,
        compiled: &CompiledQuery,
    ) -> RepoResult<Vec<RowMap>> {
        self.log_sql("select", compiled);
        let conn = ctx.resolve(self.conn);
        Ok(db::select_to_map_string(conn, &compiled.sql, &compiled.params)?)
    }

    /// Runs a compiled `COUNT(*)` and parses its single value.
    pub(crate) fn count(&self, ctx: ExecContext<'_>, compiled: &CompiledQuery) -> RepoResult<i64> {
        let rows = self.select(ctx, compiled)?;
        let raw = rows
            .first()
            .and_then(|row| row.get("count"))
            .ok_or_else(|| RepoError::InvalidData("count query returned no rows".to_string()))?;

        raw.parse::<i64>()
            .map_err(|_| RepoError::InvalidData(format!("count value `{raw}` is not an integer")))
    }

    /// Stamps creation/update times, inserts every column and clears the
    /// record's dirty set.
    pub(crate) fn insert_record<R: Record>(
        &self,
        ctx: ExecContext<'_>,
        table: &str,
        record: &mut R,
    ) -> RepoResult<()> {
        let instant = self.now();
        let now = format_datetime(instant);
        record.touch_created_at(&now);
        record.touch_updated_at(&now);

        let compiled = insert_sql(table, &record.data());
        self.execute(ctx, "insert", &compiled)?;

        record.mark_as_not_dirty();
        record.set_observed_at(instant);
        Ok(())
    }

    /// Stamps the update time and writes only the changed columns.
    ///
    /// The id column is never part of the update set.
    pub(crate) fn update_record<R: Record>(
        &self,
        ctx: ExecContext<'_>,
        table: &str,
        record: &mut R,
    ) -> RepoResult<()> {
        let instant = self.now();
        record.touch_updated_at(&format_datetime(instant));

        let changes: Vec<(&'static str, String)> = record
            .data_changed()
            .into_iter()
            .filter(|(column, _)| *column != COLUMN_ID)
            .collect();

        if changes.is_empty() {
            return Ok(());
        }

        let compiled = update_sql(table, &changes, COLUMN_ID, record.id());
        self.execute(ctx, "update", &compiled)?;

        record.mark_as_not_dirty();
        record.set_observed_at(instant);
        Ok(())
    }

    pub(crate) fn delete_by_id(&self, ctx: ExecContext<'_>, table: &str, id: &str) -> RepoResult<()> {
        let compiled = delete_sql(table, COLUMN_ID, id);
        self.execute(ctx, "delete", &compiled)?;
        Ok(())
    }

    fn execute(
        &self,
        ctx: ExecContext<'_>,
        operation: &str,
        compiled: &CompiledQuery,
    ) -> RepoResult<usize> {
        self.log_sql(operation, compiled);
        let conn = ctx.resolve(self.conn);
        Ok(db::execute(conn, &compiled.sql, &compiled.params)?)
    }

    fn log_sql(&self, operation: &str, compiled: &CompiledQuery) {
        if !self.options.debug_enabled {
            return;
        }

        debug!(
            "event=sql module=repo op={} sql={} params={}",
            operation,
            sanitize_message(&compiled.sql, MAX_LOGGED_SQL_CHARS),
            sanitize_message(&format!("{:?}", compiled.params), MAX_LOGGED_PARAMS_CHARS)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::StoreOptions;
    use crate::repo::RepoError;

    #[test]
    fn options_require_both_table_names() {
        let err = StoreOptions::new("", "relations").validate().unwrap_err();
        assert!(matches!(err, RepoError::InvalidOptions(message) if message.contains("group_table_name")));

        let err = StoreOptions::new("groups", " ").validate().unwrap_err();
        assert!(matches!(err, RepoError::InvalidOptions(message) if message.contains("relation_table_name")));
    }

    #[test]
    fn options_reject_shared_table() {
        let err = StoreOptions::new("t", "t").validate().unwrap_err();
        assert!(matches!(err, RepoError::InvalidOptions(_)));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: StoreOptions = serde_json::from_str(
            r#"{"group_table_name": "groups", "relation_table_name": "relations", "debug_enabled": true}"#,
        )
        .unwrap();

        assert_eq!(options.group_table_name, "groups");
        assert!(options.debug_enabled);
        assert!(!options.automigrate_enabled);
        assert!(options.validate().is_ok());
    }
}
