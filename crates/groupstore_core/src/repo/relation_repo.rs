//! Relation persistence operations.
//!
//! # Invariants
//! - Create rejects a relation with an empty entity type, entity id or group
//!   id, and rejects a triple that already has a visible relation.
//! - Soft-deleted relations do not block re-creating the same triple.

use super::{RepoError, RepoResult, SqliteStore};
use crate::clock::format_datetime;
use crate::db::ExecContext;
use crate::model::record::Record;
use crate::model::relation::Relation;
use crate::query::RelationQuery;
use crate::sql::compile_relation_query;

/// Relation operations exposed by a store.
pub trait RelationRepository {
    fn relation_count(&self, ctx: ExecContext<'_>, query: &RelationQuery) -> RepoResult<i64>;

    /// Inserts `relation` after a duplicate check on its triple.
    ///
    /// # Errors
    /// - `MissingField` when entity type, entity id or group id is empty.
    /// - `Conflict` when a visible relation already links the triple.
    fn relation_create(&self, ctx: ExecContext<'_>, relation: &mut Relation) -> RepoResult<()>;

    fn relation_delete(&self, ctx: ExecContext<'_>, relation: &Relation) -> RepoResult<()>;

    fn relation_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()>;

    /// Finds the visible relation linking `entity_type`/`entity_id` to
    /// `group_id`.
    fn relation_find_by_entity_and_group(
        &self,
        ctx: ExecContext<'_>,
        entity_type: &str,
        entity_id: &str,
        group_id: &str,
    ) -> RepoResult<Option<Relation>>;

    fn relation_find_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<Option<Relation>>;

    fn relation_list(&self, ctx: ExecContext<'_>, query: &RelationQuery)
        -> RepoResult<Vec<Relation>>;

    fn relation_soft_delete(&self, ctx: ExecContext<'_>, relation: &mut Relation)
        -> RepoResult<()>;

    /// # Errors
    /// - `NotFound` when no visible relation has `id`.
    fn relation_soft_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()>;

    fn relation_update(&self, ctx: ExecContext<'_>, relation: &mut Relation) -> RepoResult<()>;
}

impl RelationRepository for SqliteStore<'_> {
    fn relation_count(&self, ctx: ExecContext<'_>, query: &RelationQuery) -> RepoResult<i64> {
        let query = query.clone().set_count_only(true);
        let now = format_datetime(self.now());
        let compiled = compile_relation_query(self.relation_table(), &query, &now)?;
        self.count(ctx, &compiled)
    }

    fn relation_create(&self, ctx: ExecContext<'_>, relation: &mut Relation) -> RepoResult<()> {
        require_id(relation.id())?;
        require_field("entity_type", relation.entity_type())?;
        require_field("entity_id", relation.entity_id())?;
        require_field("group_id", relation.group_id())?;

        let existing = self.relation_find_by_entity_and_group(
            ctx,
            relation.entity_type(),
            relation.entity_id(),
            relation.group_id(),
        )?;
        if existing.is_some() {
            return Err(RepoError::Conflict {
                entity_type: relation.entity_type().to_string(),
                entity_id: relation.entity_id().to_string(),
                group_id: relation.group_id().to_string(),
            });
        }

        self.insert_record(ctx, self.relation_table(), relation)
    }

    fn relation_delete(&self, ctx: ExecContext<'_>, relation: &Relation) -> RepoResult<()> {
        self.relation_delete_by_id(ctx, relation.id())
    }

    fn relation_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()> {
        require_id(id)?;
        self.delete_by_id(ctx, self.relation_table(), id)
    }

    fn relation_find_by_entity_and_group(
        &self,
        ctx: ExecContext<'_>,
        entity_type: &str,
        entity_id: &str,
        group_id: &str,
    ) -> RepoResult<Option<Relation>> {
        for (name, value) in [
            ("entity type", entity_type),
            ("entity id", entity_id),
            ("group id", group_id),
        ] {
            if value.trim().is_empty() {
                return Err(RepoError::InvalidArgument(format!("relation {name} is empty")));
            }
        }

        let query = RelationQuery::new()
            .set_entity_type(entity_type)
            .set_entity_id(entity_id)
            .set_group_id(group_id)
            .set_limit(1);
        Ok(self.relation_list(ctx, &query)?.into_iter().next())
    }

    fn relation_find_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<Option<Relation>> {
        require_id(id)?;

        let query = RelationQuery::new().set_id(id).set_limit(1);
        Ok(self.relation_list(ctx, &query)?.into_iter().next())
    }

    fn relation_list(
        &self,
        ctx: ExecContext<'_>,
        query: &RelationQuery,
    ) -> RepoResult<Vec<Relation>> {
        let query = query.clone().set_count_only(false);
        let now = self.now();
        let compiled = compile_relation_query(self.relation_table(), &query, &format_datetime(now))?;
        self.list_records(ctx, &compiled, now, Relation::from_row)
    }

    fn relation_soft_delete(
        &self,
        ctx: ExecContext<'_>,
        relation: &mut Relation,
    ) -> RepoResult<()> {
        relation.touch_soft_deleted_at(&format_datetime(self.now()));
        self.relation_update(ctx, relation)
    }

    fn relation_soft_delete_by_id(&self, ctx: ExecContext<'_>, id: &str) -> RepoResult<()> {
        match self.relation_find_by_id(ctx, id)? {
            Some(mut relation) => self.relation_soft_delete(ctx, &mut relation),
            None => Err(RepoError::NotFound(id.to_string())),
        }
    }

    fn relation_update(&self, ctx: ExecContext<'_>, relation: &mut Relation) -> RepoResult<()> {
        require_id(relation.id())?;
        self.update_record(ctx, self.relation_table(), relation)
    }
}

fn require_id(id: &str) -> RepoResult<()> {
    if id.trim().is_empty() {
        return Err(RepoError::InvalidArgument(
            "relation id is empty".to_string(),
        ));
    }
    Ok(())
}

fn require_field(field: &'static str, value: &str) -> RepoResult<()> {
    if value.trim().is_empty() {
        return Err(RepoError::MissingField {
            record: "relation",
            field,
        });
    }
    Ok(())
}
