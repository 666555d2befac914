use nexplan_core::db::open_db;
use nexplan_core::{
    DocumentStorage, Project, ProjectStore, SqliteDocumentStorage, StorageEvent,
    DEFAULT_STORAGE_KEY,
};

#[test]
fn save_then_load_returns_latest_value() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("state.sqlite3")).unwrap();
    let storage = SqliteDocumentStorage::try_new(&conn).unwrap();

    assert!(storage.load("board").unwrap().is_none());
    storage.save("board", "first").unwrap();
    storage.save("board", "second").unwrap();

    assert_eq!(storage.load("board").unwrap().as_deref(), Some("second"));
    let revision: i64 = conn
        .query_row(
            "SELECT revision FROM kv_store WHERE key = 'board';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(revision, 2);
}

#[test]
fn own_writes_are_not_reported_as_external() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("state.sqlite3")).unwrap();
    let storage = SqliteDocumentStorage::try_new(&conn).unwrap();

    storage.save("board", "mine").unwrap();

    assert!(storage.poll_external_changes("board").unwrap().is_empty());
}

#[test]
fn writes_from_another_connection_are_reported_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.sqlite3");
    let conn_local = open_db(&path).unwrap();
    let conn_remote = open_db(&path).unwrap();
    let local = SqliteDocumentStorage::try_new(&conn_local).unwrap();
    let remote = SqliteDocumentStorage::try_new(&conn_remote).unwrap();

    remote.save("board", "remote v1").unwrap();

    assert_eq!(
        local.poll_external_changes("board").unwrap(),
        vec![StorageEvent {
            key: "board".to_string(),
            new_value: Some("remote v1".to_string()),
        }]
    );
    assert!(local.poll_external_changes("board").unwrap().is_empty());

    remote.save("other_key", "noise").unwrap();
    assert!(local.poll_external_changes("board").unwrap().is_empty());

    conn_remote
        .execute("DELETE FROM kv_store WHERE key = 'board';", [])
        .unwrap();
    assert_eq!(
        local.poll_external_changes("board").unwrap(),
        vec![StorageEvent {
            key: "board".to_string(),
            new_value: None,
        }]
    );
}

#[test]
fn second_store_on_same_file_picks_up_changes_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.sqlite3");
    let conn_a = open_db(&path).unwrap();
    let conn_b = open_db(&path).unwrap();
    let mut store_a =
        ProjectStore::open(SqliteDocumentStorage::try_new(&conn_a).unwrap(), DEFAULT_STORAGE_KEY);
    let mut store_b =
        ProjectStore::open(SqliteDocumentStorage::try_new(&conn_b).unwrap(), DEFAULT_STORAGE_KEY);

    store_a.update_cell("r1", "c2", "Done").unwrap();
    store_b.update_project_name("Edited in B").unwrap();

    assert_eq!(store_a.sync_external().unwrap(), 1);
    assert_eq!(store_a.project().name, "Edited in B");
    // B never saw A's cell edit, and its later write wins wholesale.
    assert_eq!(store_a.project().row("r1").unwrap().value("c2"), "In Progress");

    assert_eq!(store_b.sync_external().unwrap(), 0);
    assert_eq!(store_a.sync_external().unwrap(), 0);
}

#[test]
fn external_garbage_is_ignored_by_sync() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.sqlite3");
    let conn_local = open_db(&path).unwrap();
    let conn_remote = open_db(&path).unwrap();
    let mut store = ProjectStore::open(
        SqliteDocumentStorage::try_new(&conn_local).unwrap(),
        DEFAULT_STORAGE_KEY,
    );
    let before: Project = store.project().clone();

    SqliteDocumentStorage::try_new(&conn_remote)
        .unwrap()
        .save(DEFAULT_STORAGE_KEY, "[1, 2, 3]")
        .unwrap();

    assert_eq!(store.sync_external().unwrap(), 0);
    assert_eq!(store.project(), &before);
}
