use citynav_core::db::migrations::{apply_migrations, latest_version};
use citynav_core::db::{open_db, open_db_in_memory, DbError};
use citynav_core::{
    AnnotatedPoint, Catalog, Coordinate, KeyValueStore, KvError, LocationStore,
    SqliteKeyValueStore,
};
use rusqlite::Connection;

#[test]
fn set_get_overwrite_remove_round_trip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();

    assert_eq!(store.get("locations_alice").unwrap(), None);

    store.set("locations_alice", b"[]").unwrap();
    assert_eq!(
        store.get("locations_alice").unwrap().as_deref(),
        Some(&b"[]"[..])
    );

    store.set("locations_alice", b"[1,2]").unwrap();
    assert_eq!(
        store.get("locations_alice").unwrap().as_deref(),
        Some(&b"[1,2]"[..])
    );

    store.remove("locations_alice").unwrap();
    store.remove("locations_alice").unwrap();
    assert_eq!(store.get("locations_alice").unwrap(), None);
}

#[test]
fn keys_are_independent_slots() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();

    store.set("locations_u1", b"one").unwrap();
    store.set("locations_u2", b"two").unwrap();

    assert_eq!(store.get("locations_u1").unwrap().as_deref(), Some(&b"one"[..]));
    assert_eq!(store.get("locations_u2").unwrap().as_deref(), Some(&b"two"[..]));
}

#[test]
fn binary_values_survive_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();

    let blob: Vec<u8> = (0u8..=255).collect();
    store.set("blob", &blob).unwrap();
    assert_eq!(store.get("blob").unwrap().as_deref(), Some(blob.as_slice()));
}

#[test]
fn rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteKeyValueStore::try_new(&conn) {
        Err(KvError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn rejects_connection_without_kv_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteKeyValueStore::try_new(&conn),
        Err(KvError::MissingRequiredTable("kv_entries"))
    ));
}

#[test]
fn migrations_are_idempotent_and_reject_future_versions() {
    let mut conn = Connection::open_in_memory().unwrap();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, latest_version());

    conn.execute_batch("PRAGMA user_version = 99;").unwrap();
    assert!(matches!(
        apply_migrations(&mut conn),
        Err(DbError::UnsupportedSchemaVersion {
            db_version: 99,
            ..
        })
    ));
}

#[test]
fn location_store_runs_over_the_sqlite_backend() {
    let conn = open_db_in_memory().unwrap();
    let kv = SqliteKeyValueStore::try_new(&conn).unwrap();

    let catalog = Catalog::new(vec![AnnotatedPoint::new(
        "IVE(ST)",
        "",
        "building.2",
        Coordinate::new(22.39002, 114.19834).unwrap(),
    )
    .unwrap()]);

    let mut store = LocationStore::new(catalog.clone(), &kv);
    store.activate("alice");
    let home = AnnotatedPoint::new("Home", "", "house", Coordinate::new(22.0, 114.0).unwrap())
        .unwrap();
    store.add(home.clone()).unwrap();
    store.deactivate();

    // A fresh store over the same connection sees the persisted point.
    let mut reopened = LocationStore::new(catalog, &kv);
    reopened.activate("alice");
    assert!(reopened.snapshot().iter().any(|p| p.id == home.id));
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("citynav.db");

    {
        let conn = open_db(&path).unwrap();
        let store = SqliteKeyValueStore::try_new(&conn).unwrap();
        store.set("locations_alice", b"persisted").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();
    assert_eq!(
        store.get("locations_alice").unwrap().as_deref(),
        Some(&b"persisted"[..])
    );
}
