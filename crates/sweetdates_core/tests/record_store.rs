use rusqlite::Connection;
use sweetdates_core::db::migrations::latest_version;
use sweetdates_core::db::DbError;
use sweetdates_core::{
    Collection, MemoryDraft, MemoryRepository, RecordStore, RepoError, SettingsRepository,
    SqliteMemoryRepository, SqliteSettingsRepository, StoreLocation,
};

#[test]
fn open_is_idempotent() {
    let mut store = RecordStore::new(StoreLocation::InMemory);
    assert!(!store.is_open());

    store.open().unwrap();
    SqliteSettingsRepository::new(&mut store)
        .set_setting("userName", "Alex")
        .unwrap();

    store.open().unwrap();
    assert!(store.is_open());
    assert_eq!(
        SqliteSettingsRepository::new(&mut store)
            .get_setting("userName")
            .unwrap()
            .as_deref(),
        Some("Alex")
    );
}

#[test]
fn failed_open_reports_unavailable_and_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("not-yet");
    let mut store = RecordStore::new(StoreLocation::file(nested.join("sweetdates.db")));

    let err = store.open().unwrap_err();
    assert!(matches!(err, RepoError::StoreUnavailable(_)));
    assert!(!store.is_open());

    std::fs::create_dir_all(&nested).unwrap();
    store.open().unwrap();
    assert_eq!(store.schema_version().unwrap(), latest_version());
}

#[test]
fn newer_schema_is_reported_as_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 42;")
        .unwrap();

    let err = RecordStore::open_at(StoreLocation::file(&path))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        RepoError::StoreUnavailable(DbError::UnsupportedSchemaVersion { db_version: 42, .. })
    ));
}

#[test]
fn file_store_persists_across_close() {
    let dir = tempfile::tempdir().unwrap();
    let location = StoreLocation::file(dir.path().join("sweetdates.db"));

    let mut store = RecordStore::open_at(location.clone()).unwrap();
    let id = SqliteMemoryRepository::new(&mut store)
        .create_memory(&MemoryDraft::new("Picnic", "2024-05-04", 4), &[b"A".to_vec()])
        .unwrap();
    store.close();
    assert!(!store.is_open());

    let mut reopened = RecordStore::open_at(location).unwrap();
    let mut repo = SqliteMemoryRepository::new(&mut reopened);
    assert_eq!(repo.get_memory(id).unwrap().unwrap().title, "Picnic");
    assert_eq!(repo.count_photos(id).unwrap(), 1);
}

#[test]
fn committed_transaction_applies_every_write() {
    let mut store = RecordStore::in_memory().unwrap();
    store
        .run_transaction(&[Collection::Settings], |tx| {
            let conn = tx.collection(Collection::Settings)?;
            conn.execute(
                "INSERT INTO settings (key, value) VALUES ('a', '1'), ('b', '2');",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    assert_eq!(count_rows(&mut store, Collection::Settings), 2);
}

#[test]
fn undeclared_collection_access_rolls_back() {
    let mut store = RecordStore::in_memory().unwrap();
    let err = store
        .run_transaction(&[Collection::Settings], |tx| {
            tx.collection(Collection::Settings)?.execute(
                "INSERT INTO settings (key, value) VALUES ('theme', 'rose');",
                [],
            )?;
            tx.collection(Collection::Photos)?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::CollectionOutOfScope(Collection::Photos)
    ));
    assert_eq!(count_rows(&mut store, Collection::Settings), 0);
}

#[test]
fn raw_sql_against_an_undeclared_table_is_refused() {
    let mut store = RecordStore::in_memory().unwrap();
    let err = store
        .run_transaction(&[Collection::Settings], |tx| {
            let conn = tx.collection(Collection::Settings)?;
            conn.execute(
                "INSERT INTO settings (key, value) VALUES ('theme', 'rose');",
                [],
            )?;
            conn.execute(
                "INSERT INTO photos (date_id, blob, sort_order, created_at)
                 VALUES (99, x'00', 0, 'now');",
                [],
            )?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::CollectionOutOfScope(Collection::Photos)
    ));
    assert_eq!(count_rows(&mut store, Collection::Settings), 0);
    assert_eq!(count_rows(&mut store, Collection::Photos), 0);
}

#[test]
fn swallowed_scope_violation_still_rolls_back() {
    let mut store = RecordStore::in_memory().unwrap();
    let err = store
        .run_transaction(&[Collection::Settings], |tx| {
            let conn = tx.collection(Collection::Settings)?;
            conn.execute(
                "INSERT INTO settings (key, value) VALUES ('theme', 'rose');",
                [],
            )?;
            let peek = conn.query_row("SELECT COUNT(title) FROM dates;", [], |row| {
                row.get::<_, i64>(0)
            });
            assert!(peek.is_err());
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::CollectionOutOfScope(Collection::Memories)
    ));
    assert_eq!(count_rows(&mut store, Collection::Settings), 0);
}

#[test]
fn scope_guard_is_lifted_after_the_transaction() {
    let mut store = RecordStore::in_memory().unwrap();
    store
        .run_transaction(&[Collection::Settings], |tx| {
            tx.collection(Collection::Settings)?.execute(
                "INSERT INTO settings (key, value) VALUES ('userName', 'Alex');",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    let id = SqliteMemoryRepository::new(&mut store)
        .create_memory(&MemoryDraft::new("Picnic", "2024-05-04", 4), &[b"A".to_vec()])
        .unwrap();
    assert_eq!(
        SqliteMemoryRepository::new(&mut store).count_photos(id).unwrap(),
        1
    );
    assert_eq!(
        SqliteSettingsRepository::new(&mut store)
            .get_setting("userName")
            .unwrap()
            .as_deref(),
        Some("Alex")
    );
}

#[test]
fn sqlite_failure_inside_body_becomes_transaction_failure() {
    let mut store = RecordStore::in_memory().unwrap();
    let err = store
        .run_transaction(&[Collection::Memories, Collection::Photos], |tx| {
            tx.collection(Collection::Photos)?.execute(
                "INSERT INTO photos (date_id, blob, sort_order, created_at)
                 VALUES (1, x'00', 0, 'now');",
                [],
            )?;
            tx.collection(Collection::Memories)?
                .execute("INSERT INTO no_such_table VALUES (1);", [])?;
            Ok(())
        })
        .unwrap_err();

    match err {
        RepoError::TransactionFailure { scope, .. } => {
            assert_eq!(scope, vec![Collection::Memories, Collection::Photos]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_rows(&mut store, Collection::Photos), 0);
}

#[test]
fn empty_scope_is_rejected() {
    let mut store = RecordStore::in_memory().unwrap();
    let err = store.run_transaction(&[], |_| Ok(())).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn reset_erases_everything_and_leaves_a_usable_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = RecordStore::open_at(StoreLocation::file(dir.path().join("s.db"))).unwrap();
    SqliteSettingsRepository::new(&mut store)
        .set_setting("userName", "Alex")
        .unwrap();
    let old_id = SqliteMemoryRepository::new(&mut store)
        .create_memory(
            &MemoryDraft::new("Beach Day", "2024-06-01", 5),
            &[b"A".to_vec(), b"B".to_vec()],
        )
        .unwrap();

    store.reset().unwrap();

    assert_eq!(store.schema_version().unwrap(), latest_version());
    for collection in Collection::ALL {
        assert_eq!(count_rows(&mut store, collection), 0, "{collection:?} not empty");
    }

    let mut repo = SqliteMemoryRepository::new(&mut store);
    assert!(repo.get_memory(old_id).unwrap().is_none());
    let new_id = repo
        .create_memory(&MemoryDraft::new("Fresh start", "2024-07-01", 3), &[])
        .unwrap();
    assert!(repo.get_memory(new_id).unwrap().is_some());
}

fn count_rows(store: &mut RecordStore, collection: Collection) -> i64 {
    store
        .run_transaction(&[collection], |tx| {
            let sql = format!("SELECT COUNT(*) FROM {};", collection.table_name());
            Ok(tx.collection(collection)?.query_row(&sql, [], |row| row.get(0))?)
        })
        .unwrap()
}
