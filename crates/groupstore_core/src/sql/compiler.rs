//! Compiles group/relation query specifications into SQL.
//!
//! Predicates are appended in a fixed order: id, id set, entity-specific
//! equality filters, status set, title match, created-at range, then the
//! soft-delete visibility predicate last.

use super::{CompiledQuery, SelectStatement};
use crate::db::schema::{
    COLUMN_CREATED_AT, COLUMN_ENTITY_ID, COLUMN_ENTITY_TYPE, COLUMN_GROUP_ID, COLUMN_HANDLE,
    COLUMN_ID, COLUMN_SOFT_DELETED_AT, COLUMN_STATUS, COLUMN_TITLE,
};
use crate::query::{GroupQuery, QueryResult, RelationQuery, SORT_ASC};

/// Validates `query` and renders it against `table`.
///
/// `now` is the current instant in the clock's text format; rows whose
/// soft-delete stamp is not after it are hidden unless the query includes
/// soft-deleted rows. Count-only queries render as `COUNT(*)`.
pub fn compile_group_query(table: &str, query: &GroupQuery, now: &str) -> QueryResult<CompiledQuery> {
    query.validate()?;

    let mut select = SelectStatement::from_table(table);

    if query.has_id() {
        select.where_eq(COLUMN_ID, query.id());
    }
    if query.has_id_in() {
        select.where_in(COLUMN_ID, query.id_in());
    }
    if query.has_status() {
        select.where_eq(COLUMN_STATUS, query.status());
    }
    if query.has_handle() {
        select.where_eq(COLUMN_HANDLE, query.handle());
    }
    if query.has_status_in() {
        select.where_in(COLUMN_STATUS, query.status_in());
    }
    if query.has_title_like() {
        select.where_like_ci(COLUMN_TITLE, format!("%{}%", query.title_like()));
    }

    apply_created_at_range(
        &mut select,
        query.has_created_at_gte().then(|| query.created_at_gte()),
        query.has_created_at_lte().then(|| query.created_at_lte()),
    );

    if !query.soft_deleted_included() {
        select.where_gt(COLUMN_SOFT_DELETED_AT, now);
    }

    if query.is_count_only() {
        return Ok(select.to_count());
    }

    if query.has_order_by() {
        select.order_by(
            query.order_by(),
            is_ascending(query.has_sort_direction().then(|| query.sort_direction())),
        );
    }
    if query.has_limit() {
        select.limit(query.limit());
    }
    if query.has_offset() {
        select.offset(query.offset());
    }
    select.columns(query.columns());

    Ok(select.to_select())
}

/// Validates `query` and renders it against `table`.
///
/// Same visibility, ordering and count-only rules as [`compile_group_query`].
pub fn compile_relation_query(
    table: &str,
    query: &RelationQuery,
    now: &str,
) -> QueryResult<CompiledQuery> {
    query.validate()?;

    let mut select = SelectStatement::from_table(table);

    if query.has_id() {
        select.where_eq(COLUMN_ID, query.id());
    }
    if query.has_id_in() {
        select.where_in(COLUMN_ID, query.id_in());
    }
    if query.has_entity_type() {
        select.where_eq(COLUMN_ENTITY_TYPE, query.entity_type());
    }
    if query.has_entity_id() {
        select.where_eq(COLUMN_ENTITY_ID, query.entity_id());
    }
    if query.has_group_id() {
        select.where_eq(COLUMN_GROUP_ID, query.group_id());
    }

    apply_created_at_range(
        &mut select,
        query.has_created_at_gte().then(|| query.created_at_gte()),
        query.has_created_at_lte().then(|| query.created_at_lte()),
    );

    if !query.soft_deleted_included() {
        select.where_gt(COLUMN_SOFT_DELETED_AT, now);
    }

    if query.is_count_only() {
        return Ok(select.to_count());
    }

    if query.has_order_by() {
        select.order_by(
            query.order_by(),
            is_ascending(query.has_sort_direction().then(|| query.sort_direction())),
        );
    }
    if query.has_limit() {
        select.limit(query.limit());
    }
    if query.has_offset() {
        select.offset(query.offset());
    }
    select.columns(query.columns());

    Ok(select.to_select())
}

fn apply_created_at_range(select: &mut SelectStatement, gte: Option<&str>, lte: Option<&str>) {
    if let Some(lower) = gte {
        select.where_gte(COLUMN_CREATED_AT, lower);
    }
    if let Some(upper) = lte {
        select.where_lte(COLUMN_CREATED_AT, upper);
    }
}

/// Descending unless the direction is the ascending token.
fn is_ascending(direction: Option<&str>) -> bool {
    direction.is_some_and(|direction| direction.eq_ignore_ascii_case(SORT_ASC))
}

#[cfg(test)]
mod tests {
    use super::{compile_group_query, compile_relation_query, is_ascending};
    use crate::query::{GroupQuery, RelationQuery};
    use rusqlite::types::Value;

    const NOW: &str = "2024-05-01 12:00:00";

    fn text(value: &str) -> Value {
        Value::Text(value.to_string())
    }

    #[test]
    fn empty_group_query_hides_soft_deleted_rows() {
        let compiled = compile_group_query("groups", &GroupQuery::new(), NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT * FROM \"groups\" WHERE \"soft_deleted_at\" > ?"
        );
        assert_eq!(compiled.params, vec![text(NOW)]);
    }

    #[test]
    fn soft_deleted_included_drops_visibility_predicate() {
        let query = GroupQuery::new().set_soft_deleted_included(true);
        let compiled = compile_group_query("groups", &query, NOW).unwrap();

        assert_eq!(compiled.sql, "SELECT * FROM \"groups\"");
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn group_predicates_follow_fixed_order() {
        let query = GroupQuery::new()
            .set_title_like("Admin")
            .set_status_in(["active", "inactive"])
            .set_handle("admins")
            .set_status("active")
            .set_id_in(["G1", "G2"])
            .set_id("G1")
            .set_created_at_lte("2024-12-31 23:59:59")
            .set_created_at_gte("2024-01-01 00:00:00");

        let compiled = compile_group_query("groups", &query, NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT * FROM \"groups\" WHERE \"id\" = ? AND \"id\" IN (?, ?) \
             AND \"status\" = ? AND \"handle\" = ? AND \"status\" IN (?, ?) \
             AND LOWER(\"title\") LIKE LOWER(?) \
             AND \"created_at\" >= ? AND \"created_at\" <= ? \
             AND \"soft_deleted_at\" > ?"
        );
        assert_eq!(
            compiled.params,
            vec![
                text("G1"),
                text("G1"),
                text("G2"),
                text("active"),
                text("admins"),
                text("active"),
                text("inactive"),
                text("%Admin%"),
                text("2024-01-01 00:00:00"),
                text("2024-12-31 23:59:59"),
                text(NOW),
            ]
        );
    }

    #[test]
    fn single_created_at_bound_applies_only_that_bound() {
        let query = GroupQuery::new()
            .set_created_at_lte("2024-12-31 23:59:59")
            .set_soft_deleted_included(true);
        let compiled = compile_group_query("groups", &query, NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT * FROM \"groups\" WHERE \"created_at\" <= ?"
        );
    }

    #[test]
    fn order_defaults_to_descending() {
        let query = GroupQuery::new()
            .set_order_by("created_at")
            .set_soft_deleted_included(true);
        let compiled = compile_group_query("groups", &query, NOW).unwrap();
        assert_eq!(
            compiled.sql,
            "SELECT * FROM \"groups\" ORDER BY \"created_at\" DESC"
        );

        let ascending = query.clone().set_sort_direction("ASC");
        let compiled = compile_group_query("groups", &ascending, NOW).unwrap();
        assert!(compiled.sql.ends_with("ORDER BY \"created_at\" ASC"));

        let unknown = query.set_sort_direction("sideways");
        let compiled = compile_group_query("groups", &unknown, NOW).unwrap();
        assert!(compiled.sql.ends_with("ORDER BY \"created_at\" DESC"));
    }

    #[test]
    fn sort_direction_is_case_insensitive() {
        assert!(is_ascending(Some("asc")));
        assert!(is_ascending(Some("Asc")));
        assert!(!is_ascending(Some("desc")));
        assert!(!is_ascending(None));
    }

    #[test]
    fn list_applies_projection_and_pagination() {
        let query = GroupQuery::new()
            .set_columns(["id", "title"])
            .set_limit(10)
            .set_offset(20);
        let compiled = compile_group_query("groups", &query, NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT \"id\", \"title\" FROM \"groups\" WHERE \"soft_deleted_at\" > ? LIMIT ? OFFSET ?"
        );
        assert_eq!(
            compiled.params,
            vec![text(NOW), Value::Integer(10), Value::Integer(20)]
        );
    }

    #[test]
    fn count_only_never_emits_pagination_or_projection() {
        let query = GroupQuery::new()
            .set_status("active")
            .set_columns(["id"])
            .set_order_by("title")
            .set_limit(10)
            .set_offset(20)
            .set_count_only(true);
        let compiled = compile_group_query("groups", &query, NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT COUNT(*) AS \"count\" FROM \"groups\" WHERE \"status\" = ? AND \"soft_deleted_at\" > ?"
        );
        assert!(!compiled.sql.contains("LIMIT"));
        assert!(!compiled.sql.contains("OFFSET"));
        assert_eq!(compiled.params, vec![text("active"), text(NOW)]);
    }

    #[test]
    fn invalid_query_produces_no_sql() {
        let query = GroupQuery::new().set_id("");
        let err = compile_group_query("groups", &query, NOW).unwrap_err();
        assert_eq!(err.field, "id");
    }

    #[test]
    fn relation_triple_compiles_to_equality_filters() {
        let query = RelationQuery::new()
            .set_group_id("PERMISSION_01")
            .set_entity_id("USER_01")
            .set_entity_type("USER")
            .set_limit(1);
        let compiled = compile_relation_query("relations", &query, NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT * FROM \"relations\" WHERE \"entity_type\" = ? AND \"entity_id\" = ? \
             AND \"group_id\" = ? AND \"soft_deleted_at\" > ? LIMIT ?"
        );
        assert_eq!(
            compiled.params,
            vec![
                text("USER"),
                text("USER_01"),
                text("PERMISSION_01"),
                text(NOW),
                Value::Integer(1),
            ]
        );
    }

    #[test]
    fn relation_count_keeps_filters() {
        let query = RelationQuery::new()
            .set_group_id("PERMISSION_01")
            .set_limit(5)
            .set_count_only(true)
            .set_soft_deleted_included(true);
        let compiled = compile_relation_query("relations", &query, NOW).unwrap();

        assert_eq!(
            compiled.sql,
            "SELECT COUNT(*) AS \"count\" FROM \"relations\" WHERE \"group_id\" = ?"
        );
    }
}
