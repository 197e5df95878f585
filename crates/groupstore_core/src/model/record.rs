//! Behavior shared by persisted, timestamped, soft-deletable records.

use crate::clock::{parse_datetime, Clock, SystemClock};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

/// Columns modified since the record was created, hydrated or persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyColumns {
    columns: BTreeSet<&'static str>,
}

impl DirtyColumns {
    pub fn mark(&mut self, column: &'static str) {
        self.columns.insert(column);
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
    }
}

/// A row-backed record with an immutable id, timestamps and a soft-delete
/// stamp. Implemented by `Group` and `Relation`; the store's write paths are
/// written once against this trait.
pub trait Record {
    fn id(&self) -> &str;

    fn soft_deleted_at(&self) -> &str;

    fn touch_created_at(&mut self, now: &str);

    fn touch_updated_at(&mut self, now: &str);

    fn touch_soft_deleted_at(&mut self, now: &str);

    /// Every column with its current value, in table column order.
    fn data(&self) -> Vec<(&'static str, String)>;

    fn dirty(&self) -> &DirtyColumns;

    fn dirty_mut(&mut self) -> &mut DirtyColumns;

    /// Only the columns changed since the last persist or hydration.
    fn data_changed(&self) -> Vec<(&'static str, String)> {
        let dirty = self.dirty();
        self.data()
            .into_iter()
            .filter(|(column, _)| dirty.contains(column))
            .collect()
    }

    /// Declares the in-memory state equal to the persisted row.
    fn mark_as_not_dirty(&mut self) {
        self.dirty_mut().clear();
    }

    /// Instant, by the store's clock, at which a store last read or wrote
    /// this record. `None` until a store has touched it.
    fn observed_at(&self) -> Option<NaiveDateTime>;

    fn set_observed_at(&mut self, now: NaiveDateTime);

    /// Soft-deleted when the stamp is not after `now`, the same rule the
    /// store's visibility predicate (`soft_deleted_at > now`) applies.
    ///
    /// A missing or unparseable stamp counts as not deleted.
    fn is_soft_deleted_at(&self, now: NaiveDateTime) -> bool {
        parse_datetime(self.soft_deleted_at()).is_some_and(|stamp| stamp <= now)
    }

    /// Soft-delete state as of the store clock that last read or wrote the
    /// record; falls back to the system clock for records no store touched.
    fn is_soft_deleted(&self) -> bool {
        let now = self.observed_at().unwrap_or_else(|| SystemClock.now());
        self.is_soft_deleted_at(now)
    }
}
