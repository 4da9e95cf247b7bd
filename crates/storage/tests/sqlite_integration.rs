use storage::repository::{KeyValueStore, Storage, StorageKey};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_missing_key_loads_none() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_missing?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert!(repo.load(StorageKey::Feedbacks).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_removing_absent_key_succeeds() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_remove_absent?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.remove(StorageKey::Bookmarks).await.unwrap();
    assert!(repo.load(StorageKey::Bookmarks).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_save_overwrites_and_remove_deletes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.save(StorageKey::Bookmarks, "[]").await.unwrap();
    repo.save(StorageKey::Bookmarks, r#"[{"id":1}]"#).await.unwrap();
    assert_eq!(
        repo.load(StorageKey::Bookmarks).await.unwrap().as_deref(),
        Some(r#"[{"id":1}]"#)
    );

    repo.remove(StorageKey::Bookmarks).await.unwrap();
    assert!(repo.load(StorageKey::Bookmarks).await.unwrap().is_none());

    // removing again is fine
    repo.remove(StorageKey::Bookmarks).await.unwrap();
}

#[tokio::test]
async fn sqlite_keys_are_independent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_keys?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    for key in StorageKey::ALL {
        repo.save(key, key.as_str()).await.unwrap();
    }
    repo.remove(StorageKey::User).await.unwrap();

    assert!(repo.load(StorageKey::User).await.unwrap().is_none());
    assert_eq!(
        repo.load(StorageKey::UserProgress).await.unwrap().as_deref(),
        Some("userProgress")
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");
}

#[tokio::test]
async fn storage_sqlite_constructor_migrates() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.save(StorageKey::ViewedItems, r#"["article-1"]"#).await.unwrap();
    assert_eq!(
        storage.kv.load(StorageKey::ViewedItems).await.unwrap().as_deref(),
        Some(r#"["article-1"]"#)
    );
}
