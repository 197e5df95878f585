//! Relation domain model: membership of an external entity in a group.
//!
//! # Invariants
//! - `(entity_type, entity_id, group_id)` is unique among relations that are
//!   not soft-deleted; the store checks this before insert.
//! - `group_id` references `Group::id` by convention only, with no database
//!   foreign key.

use super::metas::{decode_metas, encode_metas, Metas, MetasResult};
use super::record::{DirtyColumns, Record};
use crate::clock::{parse_datetime, Clock, SystemClock, MAX_DATETIME};
use crate::db::schema::{
    COLUMN_CREATED_AT, COLUMN_ENTITY_ID, COLUMN_ENTITY_TYPE, COLUMN_GROUP_ID, COLUMN_ID,
    COLUMN_MEMO, COLUMN_METAS, COLUMN_SOFT_DELETED_AT, COLUMN_UPDATED_AT,
};
use crate::db::RowMap;
use crate::ids::new_human_uid;
use chrono::NaiveDateTime;

/// Link between an external entity (type + id) and a group.
#[derive(Debug, Clone)]
pub struct Relation {
    id: String,
    entity_type: String,
    entity_id: String,
    group_id: String,
    memo: String,
    metas: String,
    created_at: String,
    updated_at: String,
    soft_deleted_at: String,
    dirty: DirtyColumns,
    observed_at: Option<NaiveDateTime>,
}

/// Equal when every column value and the dirty set match; the observation
/// instant is not part of a record's identity.
impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data() && self.dirty == other.dirty
    }
}

impl Eq for Relation {}

impl Default for Relation {
    fn default() -> Self {
        Self::new()
    }
}

impl Relation {
    /// Creates a not-deleted relation with a fresh id and no triple set.
    pub fn new() -> Self {
        let now = SystemClock.now_string();
        let mut relation = Self::from_row(&RowMap::new());
        relation
            .set_id(new_human_uid())
            .set_memo("")
            .set_metas_raw("{}")
            .set_created_at(now.clone())
            .set_updated_at(now)
            .set_soft_deleted_at(MAX_DATETIME);
        relation
    }

    /// Hydrates a relation from a result row; missing columns read as empty.
    pub fn from_row(row: &RowMap) -> Self {
        let column = |name: &str| row.get(name).cloned().unwrap_or_default();
        Self {
            id: column(COLUMN_ID),
            entity_type: column(COLUMN_ENTITY_TYPE),
            entity_id: column(COLUMN_ENTITY_ID),
            group_id: column(COLUMN_GROUP_ID),
            memo: column(COLUMN_MEMO),
            metas: column(COLUMN_METAS),
            created_at: column(COLUMN_CREATED_AT),
            updated_at: column(COLUMN_UPDATED_AT),
            soft_deleted_at: column(COLUMN_SOFT_DELETED_AT),
            dirty: DirtyColumns::default(),
            observed_at: None,
        }
    }

    /// Soft-delete state by the clock of the store that last read or wrote
    /// this relation; see [`Record::is_soft_deleted`].
    pub fn is_soft_deleted(&self) -> bool {
        Record::is_soft_deleted(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = id.into();
        self.dirty.mark(COLUMN_ID);
        self
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn set_entity_type(&mut self, entity_type: impl Into<String>) -> &mut Self {
        self.entity_type = entity_type.into();
        self.dirty.mark(COLUMN_ENTITY_TYPE);
        self
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn set_entity_id(&mut self, entity_id: impl Into<String>) -> &mut Self {
        self.entity_id = entity_id.into();
        self.dirty.mark(COLUMN_ENTITY_ID);
        self
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn set_group_id(&mut self, group_id: impl Into<String>) -> &mut Self {
        self.group_id = group_id.into();
        self.dirty.mark(COLUMN_GROUP_ID);
        self
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.memo = memo.into();
        self.dirty.mark(COLUMN_MEMO);
        self
    }

    pub fn metas(&self) -> MetasResult<Metas> {
        decode_metas(&self.metas)
    }

    pub fn meta(&self, name: &str) -> String {
        self.metas()
            .ok()
            .and_then(|mut metas| metas.remove(name))
            .unwrap_or_default()
    }

    /// Replaces the whole metadata mapping.
    pub fn set_metas(&mut self, metas: &Metas) -> MetasResult<()> {
        let encoded = encode_metas(metas)?;
        self.set_metas_raw(encoded);
        Ok(())
    }

    pub fn set_meta(&mut self, name: impl Into<String>, value: impl Into<String>) -> MetasResult<()> {
        let mut update = Metas::new();
        update.insert(name.into(), value.into());
        self.upsert_metas(update)
    }

    pub fn upsert_metas(&mut self, metas: Metas) -> MetasResult<()> {
        let mut current = self.metas()?;
        current.extend(metas);
        self.set_metas(&current)
    }

    fn set_metas_raw(&mut self, raw: impl Into<String>) -> &mut Self {
        self.metas = raw.into();
        self.dirty.mark(COLUMN_METAS);
        self
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn created_at_datetime(&self) -> Option<NaiveDateTime> {
        parse_datetime(&self.created_at)
    }

    pub fn set_created_at(&mut self, created_at: impl Into<String>) -> &mut Self {
        self.created_at = created_at.into();
        self.dirty.mark(COLUMN_CREATED_AT);
        self
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn updated_at_datetime(&self) -> Option<NaiveDateTime> {
        parse_datetime(&self.updated_at)
    }

    pub fn set_updated_at(&mut self, updated_at: impl Into<String>) -> &mut Self {
        self.updated_at = updated_at.into();
        self.dirty.mark(COLUMN_UPDATED_AT);
        self
    }

    pub fn soft_deleted_at(&self) -> &str {
        &self.soft_deleted_at
    }

    pub fn soft_deleted_at_datetime(&self) -> Option<NaiveDateTime> {
        parse_datetime(&self.soft_deleted_at)
    }

    pub fn set_soft_deleted_at(&mut self, soft_deleted_at: impl Into<String>) -> &mut Self {
        self.soft_deleted_at = soft_deleted_at.into();
        self.dirty.mark(COLUMN_SOFT_DELETED_AT);
        self
    }
}

impl Record for Relation {
    fn id(&self) -> &str {
        &self.id
    }

    fn soft_deleted_at(&self) -> &str {
        &self.soft_deleted_at
    }

    fn touch_created_at(&mut self, now: &str) {
        self.set_created_at(now);
    }

    fn touch_updated_at(&mut self, now: &str) {
        self.set_updated_at(now);
    }

    fn touch_soft_deleted_at(&mut self, now: &str) {
        self.set_soft_deleted_at(now);
    }

    fn data(&self) -> Vec<(&'static str, String)> {
        vec![
            (COLUMN_ID, self.id.clone()),
            (COLUMN_ENTITY_TYPE, self.entity_type.clone()),
            (COLUMN_ENTITY_ID, self.entity_id.clone()),
            (COLUMN_GROUP_ID, self.group_id.clone()),
            (COLUMN_METAS, self.metas.clone()),
            (COLUMN_MEMO, self.memo.clone()),
            (COLUMN_CREATED_AT, self.created_at.clone()),
            (COLUMN_UPDATED_AT, self.updated_at.clone()),
            (COLUMN_SOFT_DELETED_AT, self.soft_deleted_at.clone()),
        ]
    }

    fn dirty(&self) -> &DirtyColumns {
        &self.dirty
    }

    fn dirty_mut(&mut self) -> &mut DirtyColumns {
        &mut self.dirty
    }

    fn observed_at(&self) -> Option<NaiveDateTime> {
        self.observed_at
    }

    fn set_observed_at(&mut self, now: NaiveDateTime) {
        self.observed_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::Relation;
    use crate::clock::MAX_DATETIME;
    use crate::model::record::Record;

    #[test]
    fn new_relation_has_defaults_and_empty_triple() {
        let relation = Relation::new();

        assert_eq!(relation.id().len(), 32);
        assert_eq!(relation.entity_type(), "");
        assert_eq!(relation.entity_id(), "");
        assert_eq!(relation.group_id(), "");
        assert_eq!(relation.soft_deleted_at(), MAX_DATETIME);
        assert!(!relation.is_soft_deleted());
    }

    #[test]
    fn data_changed_tracks_only_touched_columns() {
        let mut relation = Relation::new();
        relation.mark_as_not_dirty();

        relation.set_memo("note").touch_updated_at("2024-01-01 00:00:00");

        let changed: Vec<&str> = relation.data_changed().iter().map(|(c, _)| *c).collect();
        assert_eq!(changed, vec!["memo", "updated_at"]);
    }

    #[test]
    fn upsert_metas_merges() {
        let mut relation = Relation::new();
        relation.set_meta("a", "1").unwrap();
        relation.set_meta("b", "2").unwrap();

        let metas = relation.metas().unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(relation.meta("a"), "1");
    }
}
