use std::{collections::HashSet, sync::Arc};

use teloxide::types::ChatId;
use tempfile::TempDir;

use super::{FileUserStore, UserStore};

fn create_file_storage() -> (TempDir, FileUserStore) {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileUserStore::new(dir.path().join("users.txt"));
    (dir, storage)
}

#[tokio::test]
async fn test_load_missing_file() {
    let (_dir, storage) = create_file_storage();

    let ids = storage.load().await.unwrap();

    assert!(ids.is_empty());
}

#[tokio::test]
async fn test_save_and_load() {
    let (_dir, storage) = create_file_storage();

    assert!(storage.save(ChatId(1)).await.unwrap());
    assert!(storage.save(ChatId(-100200)).await.unwrap());

    let ids = storage.load().await.unwrap();
    assert_eq!(ids, HashSet::from([ChatId(1), ChatId(-100200)]));
}

#[tokio::test]
async fn test_save_same_id_twice() {
    let (dir, storage) = create_file_storage();

    assert!(storage.save(ChatId(42)).await.unwrap());
    // Saving the same id again should return false
    assert!(!storage.save(ChatId(42)).await.unwrap());

    let content = std::fs::read_to_string(dir.path().join("users.txt")).unwrap();
    assert_eq!(content.lines().filter(|line| *line == "42").count(), 1);
}

#[tokio::test]
async fn test_file_format() {
    let (dir, storage) = create_file_storage();

    storage.save(ChatId(30)).await.unwrap();
    storage.save(ChatId(10)).await.unwrap();
    storage.save(ChatId(20)).await.unwrap();

    let content = std::fs::read_to_string(dir.path().join("users.txt")).unwrap();
    assert_eq!(content, "10\n20\n30\n");
}

#[tokio::test]
async fn test_load_skips_malformed_lines() {
    let (dir, storage) = create_file_storage();
    std::fs::write(dir.path().join("users.txt"), "1\n\nnot-a-number\n  2  \n1\n").unwrap();

    let ids = storage.load().await.unwrap();

    assert_eq!(ids, HashSet::from([ChatId(1), ChatId(2)]));
}

#[tokio::test]
async fn test_save_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("nested").join("users.txt");
    let storage = FileUserStore::new(&path);

    storage.save(ChatId(7)).await.unwrap();

    assert_eq!(std::fs::read_to_string(path).unwrap(), "7\n");
}

#[tokio::test]
async fn test_concurrent_saves_keep_every_id() {
    let (_dir, storage) = create_file_storage();
    let storage = Arc::new(storage);

    let tasks: Vec<_> = (0..50)
        .map(|id| {
            let storage = storage.clone();
            tokio::spawn(async move { storage.save(ChatId(id)).await.unwrap() })
        })
        .collect();
    for task in tasks {
        assert!(task.await.unwrap());
    }

    let ids = storage.load().await.unwrap();
    assert_eq!(ids.len(), 50);
}
