use inventory_core::db::migrations::latest_version;
use inventory_core::db::{open_db, open_db_in_memory, DbError, SchemaMismatchPolicy};
use inventory_core::{ItemDraft, ItemRepository, SqliteItemRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "items");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.db");

    let conn_first = open_db(&path, SchemaMismatchPolicy::Reject).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path, SchemaMismatchPolicy::Reject).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "items");
}

#[test]
fn schema_version_ahead_is_rejected_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path, SchemaMismatchPolicy::Reject).unwrap_err();
    match err {
        DbError::SchemaVersionAhead {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rebuild_policy_destroys_and_recreates_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rebuild.db");

    {
        let conn = open_db(&path, SchemaMismatchPolicy::Reject).unwrap();
        let repo = SqliteItemRepository::try_new(&conn).unwrap();
        repo.insert(&ItemDraft::new("Doomed", 1.0, 1)).unwrap();
    }
    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    }

    let conn = open_db(&path, SchemaMismatchPolicy::Rebuild).unwrap();
    assert_eq!(schema_version(&conn), latest_version());

    // Rebuild starts empty and stays usable.
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    assert!(repo.list_all().unwrap().is_empty());
    repo.insert(&ItemDraft::new("Fresh", 2.0, 2)).unwrap();
    assert_eq!(repo.list_all().unwrap().len(), 1);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
