//! Group persistence operations.
//!
//! # Responsibility
//! - CRUD, soft delete, find, list and count for `Group` records.
//!
//! # Invariants
//! - `group_list` and `group_count` hide soft-deleted groups unless the
//!   query opts in with `soft_deleted_included`.
//! - `group_update` never writes the id column and writes nothing when no
//!   column changed.

use super::{RepoError, RepoResult, SqliteStore};
use crate::clock::format_datetime;
use crate::db::ExecContext;
use crate::model::group::Group;
use crate::model::record::Record;
use crate::query::GroupQuery;
use crate::sql::compile_group_query;

/// Group operations exposed by a store.
///
/// Every method takes an [`ExecContext`]; pass `ExecContext::new()` to use
/// the store's default connection.
pub trait GroupRepository {
    /// Counts groups matching `query`. Pagination, ordering and projection
    /// are ignored.
    fn group_count(&self, ctx: ExecContext<'_>, query: &GroupQuery) -> RepoResult<i64>;

    /// Inserts `group`, stamping `created_at` and `updated_at`.
    fn group_create(&self, ctx: ExecContext<'_>, group: &mut Group) -> RepoResult<()>;

    /// Permanently removes `group`.
    fn group_delete(&self, ctx: ExecContext<'_>, group: &Group) -> RepoResult<()>;

    /// Permanently removes the group with `id`. A missing row is not an error.
    fn group_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()>;

    fn group_find_by_handle(&self, ctx: ExecContext<'_>, handle: &str)
        -> RepoResult<Option<Group>>;

    fn group_find_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<Option<Group>>;

    /// Lists groups matching `query`. The count-only flag is ignored here.
    fn group_list(&self, ctx: ExecContext<'_>, query: &GroupQuery) -> RepoResult<Vec<Group>>;

    /// Stamps `soft_deleted_at` with the current time and persists it.
    fn group_soft_delete(&self, ctx: ExecContext<'_>, group: &mut Group) -> RepoResult<()>;

    /// Soft-deletes the visible group with `id`.
    ///
    /// # Errors
    /// - `NotFound` when no visible group has `id`.
    fn group_soft_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()>;

    /// Persists the changed columns of `group` and stamps `updated_at`.
    fn group_update(&self, ctx: ExecContext<'_>, group: &mut Group) -> RepoResult<()>;
}

impl GroupRepository for SqliteStore<'_> {
    fn group_count(&self, ctx: ExecContext<'_>, query: &GroupQuery) -> RepoResult<i64> {
        let query = query.clone().set_count_only(true);
        let now = format_datetime(self.now());
        let compiled = compile_group_query(self.group_table(), &query, &now)?;
        self.count(ctx, &compiled)
    }

    fn group_create(&self, ctx: ExecContext<'_>, group: &mut Group) -> RepoResult<()> {
        require_id(group.id())?;
        self.insert_record(ctx, self.group_table(), group)
    }

    fn group_delete(&self, ctx: ExecContext<'_>, group: &Group) -> RepoResult<()> {
        self.group_delete_by_id(ctx, group.id())
    }

    fn group_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()> {
        require_id(id)?;
        self.delete_by_id(ctx, self.group_table(), id)
    }

    fn group_find_by_handle(
        &self,
        ctx: ExecContext<'_>,
        handle: &str,
    ) -> RepoResult<Option<Group>> {
        if handle.trim().is_empty() {
            return Err(RepoError::InvalidArgument(
                "group handle is empty".to_string(),
            ));
        }

        let query = GroupQuery::new().set_handle(handle).set_limit(1);
        Ok(self.group_list(ctx, &query)?.into_iter().next())
    }

    fn group_find_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<Option<Group>> {
        require_id(id)?;

        let query = GroupQuery::new().set_id(id).set_limit(1);
        Ok(self.group_list(ctx, &query)?.into_iter().next())
    }

    fn group_list(&self, ctx: ExecContext<'_>, query: &GroupQuery) -> RepoResult<Vec<Group>> {
        let query = query.clone().set_count_only(false);
        let now = self.now();
        let compiled = compile_group_query(self.group_table(), &query, &format_datetime(now))?;
        self.list_records(ctx, &compiled, now, Group::from_row)
    }

    fn group_soft_delete(&self, ctx: ExecContext<'_>, group: &mut Group) -> RepoResult<()> {
        group.touch_soft_deleted_at(&format_datetime(self.now()));
        self.group_update(ctx, group)
    }

    fn group_soft_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()> {
        match self.group_find_by_id(ctx, id)? {
            Some(mut group) => self.group_soft_delete(ctx, &mut group),
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    fn group_update(&self, ctx: ExecContext<'_>, group: &mut Group) -> RepoResult<()> {
        require_id(group.id())?;
        self.update_record(ctx, self.group_table(), group)
    }
}

fn require_id(id: &str) -> RepoResult<()> {
    if id.trim().is_empty() {
        return Err(RepoError::InvalidArgument("group id is empty".to_string()));
    }
    Ok(())
}
