//! Group domain model.
//!
//! # Responsibility
//! - Define the named, statusful category that entities belong to.
//! - Track which columns changed so updates write only those.
//!
//! # Invariants
//! - `id` is assigned at construction and never written by updates.
//! - `soft_deleted_at == MAX_DATETIME` means the group is not deleted.
//! - `metas` always holds a JSON object string (or empty text).

use super::metas::{decode_metas, encode_metas, Metas, MetasResult};
use super::record::{DirtyColumns, Record};
use crate::clock::{parse_datetime, Clock, SystemClock, MAX_DATETIME};
use crate::db::schema::{
    COLUMN_CREATED_AT, COLUMN_HANDLE, COLUMN_ID, COLUMN_MEMO, COLUMN_METAS,
    COLUMN_SOFT_DELETED_AT, COLUMN_STATUS, COLUMN_TITLE, COLUMN_UPDATED_AT,
};
use crate::db::RowMap;
use crate::ids::new_human_uid;
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};

/// Lifecycle status of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupStatus {
    Active,
    Inactive,
    Deleted,
}

impl GroupStatus {
    /// Stable string stored in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl Display for GroupStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<GroupStatus> for String {
    fn from(value: GroupStatus) -> Self {
        value.as_str().to_string()
    }
}

/// A named category, persisted as one row of the group table.
///
/// Fields are only reachable through setters so every change is recorded
/// in the dirty-column set.
#[derive(Debug, Clone)]
pub struct Group {
    id: String,
    status: String,
    handle: String,
    title: String,
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
impl PartialEq for Group {
    fn eq(&self, other: &Self) -> bool {
        self.data() == other.data() && self.dirty == other.dirty
    }
}

impl Eq for Group {}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

impl Group {
    /// Creates an inactive, not-deleted group with a fresh id.
    pub fn new() -> Self {
        let now = SystemClock.now_string();
        let mut group = Self::empty();
        group
            .set_id(new_human_uid())
            .set_status(GroupStatus::Inactive)
            .set_memo("")
            .set_metas_raw("{}")
            .set_created_at(now.clone())
            .set_updated_at(now)
            .set_soft_deleted_at(MAX_DATETIME);
        group
    }

    /// Hydrates a group from a result row; missing columns read as empty.
    ///
    /// The hydrated group has no dirty columns.
    pub fn from_row(row: &RowMap) -> Self {
        let column = |name: &str| row.get(name).cloned().unwrap_or_default();
        Self {
            id: column(COLUMN_ID),
            status: column(COLUMN_STATUS),
            handle: column(COLUMN_HANDLE),
            title: column(COLUMN_TITLE),
            memo: column(COLUMN_MEMO),
            metas: column(COLUMN_METAS),
            created_at: column(COLUMN_CREATED_AT),
            updated_at: column(COLUMN_UPDATED_AT),
            soft_deleted_at: column(COLUMN_SOFT_DELETED_AT),
            dirty: DirtyColumns::default(),
            observed_at: None,
        }
    }

    fn empty() -> Self {
        Self {
            id: String::new(),
            status: String::new(),
            handle: String::new(),
            title: String::new(),
            memo: String::new(),
            metas: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
            soft_deleted_at: String::new(),
            dirty: DirtyColumns::default(),
            observed_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GroupStatus::Active.as_str()
    }

    pub fn is_inactive(&self) -> bool {
        self.status == GroupStatus::Inactive.as_str()
    }

    /// Soft-delete state by the clock of the store that last read or wrote
    /// this group; see [`Record::is_soft_deleted`].
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

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) -> &mut Self {
        self.status = status.into();
        self.dirty.mark(COLUMN_STATUS);
        self
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn set_handle(&mut self, handle: impl Into<String>) -> &mut Self {
        self.handle = handle.into();
        self.dirty.mark(COLUMN_HANDLE);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self.dirty.mark(COLUMN_TITLE);
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

    /// Decoded metadata mapping.
    pub fn metas(&self) -> MetasResult<Metas> {
        decode_metas(&self.metas)
    }

    /// One metadata value, or empty when absent or undecodable.
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

    /// Sets one metadata key, keeping the others.
    pub fn set_meta(&mut self, name: impl Into<String>, value: impl Into<String>) -> MetasResult<()> {
        let mut update = Metas::new();
        update.insert(name.into(), value.into());
        self.upsert_metas(update)
    }

    /// Merges `metas` over the current mapping.
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

impl Record for Group {
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
            (COLUMN_STATUS, self.status.clone()),
            (COLUMN_HANDLE, self.handle.clone()),
            (COLUMN_TITLE, self.title.clone()),
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
    use super::{Group, GroupStatus};
    use crate::clock::{parse_datetime, MAX_DATETIME};
    use crate::db::RowMap;
    use crate::model::metas::Metas;
    use crate::model::record::Record;

    #[test]
    fn new_group_has_defaults() {
        let group = Group::new();

        assert_eq!(group.id().len(), 32);
        assert_eq!(group.status(), "inactive");
        assert!(group.is_inactive());
        assert!(!group.is_active());
        assert_eq!(group.soft_deleted_at(), MAX_DATETIME);
        assert!(!group.is_soft_deleted());
        assert!(group.metas().unwrap().is_empty());
        assert!(group.created_at_datetime().is_some());
    }

    #[test]
    fn setters_chain_and_mark_dirty() {
        let mut group = Group::new();
        group.mark_as_not_dirty();

        group
            .set_status(GroupStatus::Active)
            .set_handle("admins")
            .set_title("Administrators");

        let changed: Vec<&str> = group.data_changed().iter().map(|(c, _)| *c).collect();
        assert_eq!(changed, vec!["status", "handle", "title"]);
        assert!(group.is_active());
    }

    #[test]
    fn hydrated_group_is_clean() {
        let mut row = RowMap::new();
        row.insert("id".to_string(), "G1".to_string());
        row.insert("status".to_string(), "active".to_string());
        row.insert("title".to_string(), "Admins".to_string());

        let group = Group::from_row(&row);
        assert_eq!(group.id(), "G1");
        assert_eq!(group.title(), "Admins");
        assert_eq!(group.handle(), "");
        assert!(group.dirty().is_empty());
        assert!(group.data_changed().is_empty());
    }

    #[test]
    fn metas_round_trip_in_memory() {
        let mut group = Group::new();
        let mut metas = Metas::new();
        metas.insert("color".to_string(), "blue".to_string());
        metas.insert("size".to_string(), "xl".to_string());
        group.set_metas(&metas).unwrap();

        assert_eq!(group.metas().unwrap(), metas);
        assert_eq!(group.meta("color"), "blue");
        assert_eq!(group.meta("missing"), "");

        group.set_meta("color", "red").unwrap();
        assert_eq!(group.meta("color"), "red");
        assert_eq!(group.meta("size"), "xl");
    }

    #[test]
    fn soft_deleted_once_stamp_is_not_after_now() {
        let mut group = Group::new();
        let now = parse_datetime("2024-06-01 00:00:00").unwrap();

        group.set_soft_deleted_at("2024-05-31 23:59:59");
        assert!(group.is_soft_deleted_at(now));

        group.set_soft_deleted_at("2024-06-01 00:00:00");
        assert!(group.is_soft_deleted_at(now));

        group.set_soft_deleted_at("2024-06-01 00:00:01");
        assert!(!group.is_soft_deleted_at(now));
    }

    #[test]
    fn observed_instant_overrides_system_clock() {
        let mut group = Group::new();
        group.set_soft_deleted_at("2099-01-01 00:00:00");
        assert!(!group.is_soft_deleted());

        group.set_observed_at(parse_datetime("2099-01-01 00:00:00").unwrap());
        assert!(group.is_soft_deleted());
    }

    #[test]
    fn equality_ignores_observed_instant() {
        let group = Group::new();
        let mut observed = group.clone();
        observed.set_observed_at(parse_datetime("2024-01-01 00:00:00").unwrap());

        assert_eq!(group, observed);
    }

    #[test]
    fn status_strings_are_stable() {
        for status in [GroupStatus::Active, GroupStatus::Inactive, GroupStatus::Deleted] {
            assert_eq!(GroupStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(GroupStatus::parse("archived"), None);
        assert_eq!(String::from(GroupStatus::Deleted), "deleted");
    }
}
