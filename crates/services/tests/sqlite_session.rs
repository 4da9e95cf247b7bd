use std::sync::Arc;

use portal_core::model::{Bookmark, ContentKind, ItemId, Role, User};
use portal_core::time::fixed_now;
use services::{Clock, SessionStore};
use storage::repository::{KeyValueStore, Storage, StorageKey};

fn user() -> User {
    User::new("Farah", "farah@example.com", "9111122223", Role::Student)
}

#[tokio::test]
async fn session_rehydrates_from_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_session_reload?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let clock = Clock::fixed(fixed_now());

    let mut store = SessionStore::load(Arc::clone(&storage.kv), clock).await.unwrap();
    store.sign_in(user()).await.unwrap();
    store
        .add_bookmark(Bookmark::new(ItemId::new(3), ContentKind::Video, "Video 3", fixed_now()))
        .await
        .unwrap();
    store.mark_viewed(ItemId::new(3), ContentKind::Video).await.unwrap();
    store.sync_current_progress().await.unwrap();

    let reloaded = SessionStore::load(Arc::clone(&storage.kv), clock).await.unwrap();
    assert_eq!(reloaded.user(), Some(&user()));
    assert_eq!(reloaded.bookmarks(), store.bookmarks());
    assert_eq!(reloaded.viewed(), store.viewed());
    assert_eq!(reloaded.all_user_progress(), store.all_user_progress());
    assert_eq!(reloaded.learning_path(), store.learning_path());
}

#[tokio::test]
async fn sign_out_clears_sqlite_slots_but_not_ledger() {
    let storage = Storage::sqlite("sqlite:file:memdb_session_signout?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let clock = Clock::fixed(fixed_now());

    let mut store = SessionStore::load(Arc::clone(&storage.kv), clock).await.unwrap();
    store.sign_in(user()).await.unwrap();
    store.mark_viewed(ItemId::new(1), ContentKind::Article).await.unwrap();
    store.sync_current_progress().await.unwrap();
    store.sign_out().await.unwrap();

    for key in [
        StorageKey::User,
        StorageKey::Bookmarks,
        StorageKey::Feedbacks,
        StorageKey::ViewedItems,
    ] {
        assert!(storage.kv.load(key).await.unwrap().is_none(), "{key} left behind");
    }

    let reloaded = SessionStore::load(Arc::clone(&storage.kv), clock).await.unwrap();
    assert!(!reloaded.is_authenticated());
    assert_eq!(reloaded.all_user_progress().len(), 1);
    assert_eq!(reloaded.all_user_progress()[0].articles_completed, 1);
}

#[tokio::test]
async fn corrupt_sqlite_value_loads_as_empty() {
    let storage = Storage::sqlite("sqlite:file:memdb_session_corrupt?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    storage
        .kv
        .save(StorageKey::Feedbacks, "[{\"id\": }]")
        .await
        .unwrap();

    let store = SessionStore::load(Arc::clone(&storage.kv), Clock::default())
        .await
        .unwrap();
    assert!(store.feedback().is_empty());
}
