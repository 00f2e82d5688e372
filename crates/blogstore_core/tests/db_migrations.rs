use blogstore_core::db::migrations::latest_version;
use blogstore_core::db::{open_db, open_db_in_memory, DbError};
use blogstore_core::{Store, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "post");
    assert_table_exists(&conn, "tag");
    assert_table_exists(&conn, "post_tag");
}

#[test]
fn foreign_keys_are_enforced_on_opened_connections() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO post_tag (post_id, tag_id) VALUES ('missing-post', 'missing-tag');",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "post");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
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
fn store_rejects_empty_connection_string() {
    for url in ["", "   "] {
        let err = Store::open(&StoreConfig::new(url)).err().unwrap();
        assert!(matches!(err, DbError::Connection(_)), "url `{url}`: {err}");
    }
}

#[test]
fn store_reports_unreachable_database_as_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("blog.db");

    let err = Store::open(&StoreConfig::new(path.to_str().unwrap()))
        .err()
        .unwrap();
    assert!(matches!(err, DbError::Connection(_)), "{err}");
}

#[test]
fn store_keeps_data_across_reopen_of_file_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blog.db");
    let config = StoreConfig::new(format!("sqlite://{}", path.display()));

    let store = Store::open(&config).unwrap();
    assert_eq!(store.location(), path.to_str().unwrap());
    store
        .acquire()
        .execute(
            "INSERT INTO tag (id, name) VALUES ('67e55044-10b1-426f-9247-bb680e5fe0c8', 'rust');",
            [],
        )
        .unwrap();
    store.close().unwrap();

    let reopened = Store::open(&config).unwrap();
    let count: i64 = reopened
        .acquire()
        .query_row("SELECT COUNT(*) FROM tag;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
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
