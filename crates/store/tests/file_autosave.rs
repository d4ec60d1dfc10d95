//! End-to-end persistence through the directory-backed store

use book_model::{Book, BookId, BookName};
use std::sync::Arc;
use std::time::Duration;
use store::{
    AutosaveConfig, AutosaveScheduler, BookStore, FileBookStore, PersistenceClient, SaveStatus,
    StoreError,
};
use tempfile::TempDir;

fn genesis(label: &str) -> Book {
    Book::new_empty(BookId::parse("genesis").unwrap(), BookName::uniform(label))
}

#[tokio::test]
async fn test_autosave_writes_latest_book_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(FileBookStore::new(temp_dir.path()));
    let autosave = AutosaveScheduler::new(
        PersistenceClient::new(Arc::clone(&store)),
        AutosaveConfig::default()
            .with_debounce(Duration::from_millis(50))
            .with_saved_display(Duration::from_millis(5000)),
    );

    autosave.schedule(Arc::new(genesis("draft")));
    autosave.schedule(Arc::new(genesis("final")));
    tokio::time::sleep(Duration::from_millis(500)).await;

    let on_disk = store.fetch_book(&BookId::parse("genesis").unwrap()).await.unwrap();
    assert_eq!(on_disk.name.english, "final");
    assert_eq!(autosave.status(), SaveStatus::Saved);
    assert!(!autosave.is_dirty());
}

#[tokio::test]
async fn test_duplicate_create_keeps_first_copy() {
    let temp_dir = TempDir::new().unwrap();
    let client = PersistenceClient::new(Arc::new(FileBookStore::new(temp_dir.path())));

    client.create_book(&genesis("Genesis")).await.unwrap();
    let err = client.create_book(&genesis("Second")).await.unwrap_err();

    assert!(matches!(err, StoreError::AlreadyExists(_)));
    let stored = client.fetch_book(&BookId::parse("genesis").unwrap()).await.unwrap();
    assert_eq!(stored.name.english, "Genesis");
}

#[tokio::test]
async fn test_soft_delete_then_list() {
    let temp_dir = TempDir::new().unwrap();
    let client = PersistenceClient::new(Arc::new(FileBookStore::new(temp_dir.path())));
    let id = BookId::parse("genesis").unwrap();

    client.create_book(&genesis("Genesis")).await.unwrap();
    client.delete_book(&id).await.unwrap();

    assert!(client.list_books().await.unwrap().is_empty());
    assert!(matches!(
        client.fetch_book(&id).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
    assert!(temp_dir.path().join(".trash").join("genesis.json").exists());
}
