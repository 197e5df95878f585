use groupstore_core::{
    open_db_in_memory, ExecContext, GroupQuery, GroupRepository, RepoError, SqliteStore,
    StoreOptions,
};

fn table_columns(conn: &rusqlite::Connection, table: &str) -> Vec<(String, String, bool)> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info(\"{table}\")"))
        .unwrap();
    stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i64>(5)? > 0,
        ))
    })
    .unwrap()
    .collect::<Result<Vec<_>, _>>()
    .unwrap()
}

#[test]
fn automigrate_creates_both_tables_with_expected_columns() {
    let conn = open_db_in_memory().unwrap();
    let options = StoreOptions::new("app_groups", "app_relations").with_automigrate(true);
    SqliteStore::new(&conn, options).unwrap();

    let group_columns = table_columns(&conn, "app_groups");
    let names: Vec<&str> = group_columns.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "status",
            "handle",
            "title",
            "metas",
            "memo",
            "created_at",
            "updated_at",
            "soft_deleted_at"
        ]
    );
    assert!(group_columns
        .iter()
        .any(|(name, kind, pk)| name == "id" && kind == "VARCHAR(40)" && *pk));
    assert!(group_columns
        .iter()
        .any(|(name, kind, _)| name == "handle" && kind == "VARCHAR(50)"));

    let relation_names: Vec<String> = table_columns(&conn, "app_relations")
        .into_iter()
        .map(|(name, _, _)| name)
        .collect();
    assert_eq!(
        relation_names,
        vec![
            "id",
            "entity_type",
            "entity_id",
            "group_id",
            "metas",
            "memo",
            "created_at",
            "updated_at",
            "soft_deleted_at"
        ]
    );
}

#[test]
fn automigrate_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let options = StoreOptions::new("g", "r").with_automigrate(true);

    let store = SqliteStore::new(&conn, options.clone()).unwrap();
    store.auto_migrate().unwrap();
    SqliteStore::new(&conn, options).unwrap();

    let index_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_r_entity_group'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(index_count, 1);
}

#[test]
fn store_without_automigrate_reports_missing_table() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn, StoreOptions::new("g", "r")).unwrap();

    let err = store
        .group_count(ExecContext::new(), &GroupQuery::new())
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    store.auto_migrate().unwrap();
    assert_eq!(
        store
            .group_count(ExecContext::new(), &GroupQuery::new())
            .unwrap(),
        0
    );
    assert!(std::ptr::eq(store.db(), &conn));
}

#[test]
fn invalid_options_fail_construction() {
    let conn = open_db_in_memory().unwrap();

    let err = SqliteStore::new(&conn, StoreOptions::default()).err().unwrap();
    assert!(matches!(err, RepoError::InvalidOptions(_)));

    let err = SqliteStore::new(&conn, StoreOptions::new("same", "same"))
        .err()
        .unwrap();
    assert!(err.to_string().contains("must differ"));
}
