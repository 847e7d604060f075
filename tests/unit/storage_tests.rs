// ============================
// tests/unit/storage_tests.rs
// ============================
//! Document store behavior observable from outside the crate
use backend_lib::storage::{to_record, DocumentStore, Filter, JsonFileStore};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_file_opens_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp_dir.path().join("fresh.json")).unwrap();
    assert!(store.all("customers").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_writes_leave_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    let store = JsonFileStore::open(&path).unwrap();

    store
        .insert("products", to_record(&json!({ "name": "Rice" })).unwrap())
        .await
        .unwrap();

    assert!(path.exists());
    let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["products"]["docs"]["1"]["name"], "Rice");
}

#[tokio::test]
async fn test_find_all_by_field() {
    let store = JsonFileStore::in_memory();
    for (email, total) in [("a@x.com", 10.0), ("b@x.com", 5.0), ("a@x.com", 7.5)] {
        store
            .insert("orders", to_record(&json!({ "email": email, "total": total })).unwrap())
            .await
            .unwrap();
    }

    let mine = store
        .find_all("orders", &Filter::eq("email", "a@x.com"))
        .await
        .unwrap();
    assert_eq!(mine.iter().map(|d| d.id).collect::<Vec<_>>(), vec![1, 3]);
}

#[tokio::test]
async fn test_unique_insert_under_concurrency_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::open(temp_dir.path().join("database.json")).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_unique(
                        "suppliers",
                        "email",
                        to_record(&json!({ "email": "farm@x.com" })).unwrap(),
                    )
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);

    let reopened = JsonFileStore::open(temp_dir.path().join("database.json")).unwrap();
    assert_eq!(reopened.all("suppliers").await.unwrap().len(), 1);
}
