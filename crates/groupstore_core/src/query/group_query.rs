//! Query specification for listing and counting groups.

use super::{
    check_column, check_columns, check_limit, check_list, check_offset, check_string,
    QueryResult,
};
use crate::db::schema::GROUP_COLUMNS;

const QUERY_NAME: &str = "group";

/// Filter, sort and pagination options for group list/count calls.
///
/// Every setter consumes and returns the query, so options chain:
///
/// ```
/// use groupstore_core::GroupQuery;
///
/// let query = GroupQuery::new().set_status("active").set_limit(10);
/// assert!(query.has_status());
/// assert_eq!(query.limit(), 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupQuery {
    id: Option<String>,
    id_in: Option<Vec<String>>,
    status: Option<String>,
    status_in: Option<Vec<String>>,
    handle: Option<String>,
    title_like: Option<String>,
    created_at_gte: Option<String>,
    created_at_lte: Option<String>,
    soft_deleted_included: Option<bool>,
    order_by: Option<String>,
    sort_direction: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
    columns: Option<Vec<String>>,
    count_only: Option<bool>,
}

impl GroupQuery {
    /// Empty query: no filters, active groups only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects set fields holding empty or out-of-range values, and sort or
    /// projection columns the table does not have.
    pub fn validate(&self) -> QueryResult<()> {
        check_string(QUERY_NAME, "id", self.id.as_ref())?;
        check_list(QUERY_NAME, "id_in", self.id_in.as_ref())?;
        check_string(QUERY_NAME, "status", self.status.as_ref())?;
        check_list(QUERY_NAME, "status_in", self.status_in.as_ref())?;
        check_string(QUERY_NAME, "handle", self.handle.as_ref())?;
        check_string(QUERY_NAME, "title_like", self.title_like.as_ref())?;
        check_string(QUERY_NAME, "created_at_gte", self.created_at_gte.as_ref())?;
        check_string(QUERY_NAME, "created_at_lte", self.created_at_lte.as_ref())?;
        check_column(QUERY_NAME, "order_by", self.order_by.as_ref(), GROUP_COLUMNS)?;
        check_string(QUERY_NAME, "sort_direction", self.sort_direction.as_ref())?;
        check_limit(QUERY_NAME, self.limit)?;
        check_offset(QUERY_NAME, self.offset)?;
        check_columns(QUERY_NAME, "columns", self.columns.as_ref(), GROUP_COLUMNS)?;
        Ok(())
    }

    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    pub fn set_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn has_id_in(&self) -> bool {
        self.id_in.is_some()
    }

    pub fn id_in(&self) -> &[String] {
        self.id_in.as_deref().unwrap_or_default()
    }

    pub fn set_id_in<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_in = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_status(&self) -> bool {
        self.status.is_some()
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    pub fn set_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn has_status_in(&self) -> bool {
        self.status_in.is_some()
    }

    pub fn status_in(&self) -> &[String] {
        self.status_in.as_deref().unwrap_or_default()
    }

    pub fn set_status_in<I, S>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.status_in = Some(statuses.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> &str {
        self.handle.as_deref().unwrap_or_default()
    }

    pub fn set_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    pub fn has_title_like(&self) -> bool {
        self.title_like.is_some()
    }

    /// Case-insensitive substring to look for in the title.
    pub fn title_like(&self) -> &str {
        self.title_like.as_deref().unwrap_or_default()
    }

    pub fn set_title_like(mut self, title_like: impl Into<String>) -> Self {
        self.title_like = Some(title_like.into());
        self
    }

    pub fn has_created_at_gte(&self) -> bool {
        self.created_at_gte.is_some()
    }

    pub fn created_at_gte(&self) -> &str {
        self.created_at_gte.as_deref().unwrap_or_default()
    }

    pub fn set_created_at_gte(mut self, created_at_gte: impl Into<String>) -> Self {
        self.created_at_gte = Some(created_at_gte.into());
        self
    }

    pub fn has_created_at_lte(&self) -> bool {
        self.created_at_lte.is_some()
    }

    pub fn created_at_lte(&self) -> &str {
        self.created_at_lte.as_deref().unwrap_or_default()
    }

    pub fn set_created_at_lte(mut self, created_at_lte: impl Into<String>) -> Self {
        self.created_at_lte = Some(created_at_lte.into());
        self
    }

    pub fn has_soft_deleted_included(&self) -> bool {
        self.soft_deleted_included.is_some()
    }

    pub fn soft_deleted_included(&self) -> bool {
        self.soft_deleted_included.unwrap_or_default()
    }

    pub fn set_soft_deleted_included(mut self, included: bool) -> Self {
        self.soft_deleted_included = Some(included);
        self
    }

    pub fn has_order_by(&self) -> bool {
        self.order_by.is_some()
    }

    pub fn order_by(&self) -> &str {
        self.order_by.as_deref().unwrap_or_default()
    }

    pub fn set_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn has_sort_direction(&self) -> bool {
        self.sort_direction.is_some()
    }

    pub fn sort_direction(&self) -> &str {
        self.sort_direction.as_deref().unwrap_or_default()
    }

    pub fn set_sort_direction(mut self, direction: impl Into<String>) -> Self {
        self.sort_direction = Some(direction.into());
        self
    }

    pub fn has_limit(&self) -> bool {
        self.limit.is_some()
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or_default()
    }

    pub fn set_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn has_offset(&self) -> bool {
        self.offset.is_some()
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or_default()
    }

    pub fn set_offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn has_columns(&self) -> bool {
        self.columns.is_some()
    }

    /// Projected columns; empty means every column.
    pub fn columns(&self) -> &[String] {
        self.columns.as_deref().unwrap_or_default()
    }

    pub fn set_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn has_count_only(&self) -> bool {
        self.count_only.is_some()
    }

    pub fn is_count_only(&self) -> bool {
        self.count_only.unwrap_or_default()
    }

    pub fn set_count_only(mut self, count_only: bool) -> Self {
        self.count_only = Some(count_only);
        self
    }
}
