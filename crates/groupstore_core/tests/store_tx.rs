use groupstore_core::{
    open_db, ExecContext, Group, GroupQuery, GroupRepository, Relation, RelationRepository,
    SqliteStore, StoreOptions,
};
use rusqlite::Connection;
use tempfile::TempDir;

fn options() -> StoreOptions {
    StoreOptions::new("groups_group", "groups_relation").with_automigrate(true)
}

fn open_pair() -> (TempDir, Connection, Connection) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groups.sqlite3");
    let writer = open_db(&path).unwrap();
    let reader = open_db(&path).unwrap();
    (dir, writer, reader)
}

#[test]
fn transactional_update_is_invisible_until_commit() {
    let (_dir, writer_conn, reader_conn) = open_pair();
    let writer = SqliteStore::new(&writer_conn, options()).unwrap();
    let reader = SqliteStore::new(&reader_conn, options()).unwrap();

    let mut group = Group::new();
    group.set_handle("GROUP_HANDLE").set_title("GROUP_TITLE");
    writer.group_create(ExecContext::new(), &mut group).unwrap();

    let tx = writer_conn.unchecked_transaction().unwrap();
    let tx_ctx = ExecContext::with_transaction(&tx);
    assert!(tx_ctx.is_transactional());

    group.set_title("GROUP_TITLE_2");
    writer.group_update(tx_ctx, &mut group).unwrap();

    let inside = writer.group_find_by_id(tx_ctx, group.id()).unwrap().unwrap();
    assert_eq!(inside.title(), "GROUP_TITLE_2");

    let outside = reader
        .group_find_by_id(ExecContext::new(), group.id())
        .unwrap()
        .unwrap();
    assert_eq!(outside.title(), "GROUP_TITLE");

    tx.commit().unwrap();

    let committed = reader
        .group_find_by_id(ExecContext::new(), group.id())
        .unwrap()
        .unwrap();
    assert_eq!(committed.title(), "GROUP_TITLE_2");
}

#[test]
fn dropped_transaction_rolls_back_create() {
    let (_dir, writer_conn, reader_conn) = open_pair();
    let writer = SqliteStore::new(&writer_conn, options()).unwrap();
    let reader = SqliteStore::new(&reader_conn, options()).unwrap();

    {
        let tx = writer_conn.unchecked_transaction().unwrap();
        let mut group = Group::new();
        group.set_handle("ephemeral");
        writer
            .group_create(ExecContext::with_transaction(&tx), &mut group)
            .unwrap();
        assert_eq!(
            writer
                .group_count(ExecContext::with_transaction(&tx), &GroupQuery::new())
                .unwrap(),
            1
        );
    }

    assert_eq!(
        reader
            .group_count(ExecContext::new(), &GroupQuery::new())
            .unwrap(),
        0
    );
    assert_eq!(
        writer
            .group_count(ExecContext::new(), &GroupQuery::new())
            .unwrap(),
        0
    );
}

#[test]
fn duplicate_check_sees_writes_of_the_same_transaction() {
    let (_dir, writer_conn, _reader_conn) = open_pair();
    let store = SqliteStore::new(&writer_conn, options()).unwrap();

    let tx = writer_conn.unchecked_transaction().unwrap();
    let ctx = ExecContext::with_transaction(&tx);

    let mut first = Relation::new();
    first
        .set_entity_type("USER")
        .set_entity_id("USER_01")
        .set_group_id("GROUP_01");
    store.relation_create(ctx, &mut first).unwrap();

    let mut second = Relation::new();
    second
        .set_entity_type("USER")
        .set_entity_id("USER_01")
        .set_group_id("GROUP_01");
    assert!(store.relation_create(ctx, &mut second).is_err());

    tx.commit().unwrap();
}
