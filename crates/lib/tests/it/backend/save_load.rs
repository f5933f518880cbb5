use std::sync::Arc;

use tempfile::TempDir;

use kobllux::{
    Error, StorageArea,
    backend::{InMemory, StorageBackend},
    constants::{MODEL, USER_NAME},
};

use crate::helpers::*;

#[tokio::test]
async fn test_in_memory_backend_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("kobllux.json");

    {
        let backend = Arc::new(InMemory::new());
        let store = StorageArea::from_shared(backend.clone(), test_config()).open_context();
        store.set(USER_NAME, "Ana");
        store.set(MODEL, "openai/gpt-4o");
        backend.save_to_file(&path).await.unwrap();
    }

    assert!(path.exists());

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.get_item(USER_NAME).unwrap().as_deref(), Some("Ana"));
    assert_eq!(
        loaded.get_item(MODEL).unwrap().as_deref(),
        Some("openai/gpt-4o")
    );
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.json");
    std::fs::write(&path, "{invalid json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_storage_error());
    assert!(matches!(err, Error::Backend(ref e) if e.is_serialization_error()));
}
