use kobllux::backend::{InMemory, StorageBackend};

#[test]
fn test_basic_operations() {
    let backend = InMemory::new();
    assert_eq!(backend.get_item("di_userName").unwrap(), None);

    backend.set_item("di_userName", "Ana").unwrap();
    assert_eq!(backend.get_item("di_userName").unwrap().as_deref(), Some("Ana"));
    assert_eq!(backend.keys().unwrap(), vec!["di_userName".to_string()]);

    backend.remove_item("di_userName").unwrap();
    backend.remove_item("di_userName").unwrap();
    assert!(backend.keys().unwrap().is_empty());
}

#[test]
fn test_quota_counts_keys_and_values() {
    let backend = InMemory::with_quota(20);
    backend.set_item("abc", "0123456789").unwrap();
    assert_eq!(backend.used_bytes(), 13);

    // replacing a value only counts the difference
    backend.set_item("abc", "01234567890123456").unwrap();

    let err = backend.set_item("other", "x").unwrap_err();
    assert!(err.is_quota_exceeded());
    assert!(err.is_storage_error());
    assert_eq!(backend.get_item("other").unwrap(), None);
}

#[test]
fn test_unavailable_backend_rejects_everything() {
    let backend = InMemory::new();
    backend.set_available(false);
    assert!(backend.get_item("k").is_err());
    assert!(backend.set_item("k", "v").unwrap_err().is_storage_error());

    backend.set_available(true);
    backend.set_item("k", "v").unwrap();
}
