use pocketnote_core::db::open_db_in_memory;
use pocketnote_core::{KeyValueStore, RepoError, SqliteKeyValueStore};
use rusqlite::Connection;

#[test]
fn sqlite_store_round_trips_and_overwrites() {
    let mut store = SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap();
    assert_eq!(store.get("notes").unwrap(), None);

    store.put("notes", "[]").unwrap();
    store
        .put_all(&[("notes", "[{\"x\":1}]"), ("tasks", "[]")])
        .unwrap();

    assert_eq!(store.get("notes").unwrap().as_deref(), Some("[{\"x\":1}]"));
    assert_eq!(store.get("tasks").unwrap().as_deref(), Some("[]"));

    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 2);
}

#[test]
fn unmigrated_connection_is_rejected() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteKeyValueStore::try_new(conn)
        .err()
        .expect("plain connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn missing_table_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE kv_store;").unwrap();
    let err = SqliteKeyValueStore::try_new(conn)
        .err()
        .expect("dropped table must be reported");
    assert!(matches!(err, RepoError::MissingRequiredTable("kv_store")));
}

#[test]
fn failed_batch_leaves_previous_values() {
    let mut store = SqliteKeyValueStore::try_new(open_db_in_memory().unwrap()).unwrap();
    store.put("notes", "old").unwrap();
    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_tasks BEFORE INSERT ON kv_store
             WHEN NEW.key = 'tasks'
             BEGIN SELECT RAISE(ABORT, 'tasks rejected'); END;",
        )
        .unwrap();

    let err = store
        .put_all(&[("notes", "new"), ("tasks", "[]")])
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(store.get("notes").unwrap().as_deref(), Some("old"));
}
