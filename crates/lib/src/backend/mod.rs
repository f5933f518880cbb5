//! Persistent storage backends.
//!
//! [`StorageBackend`] is the host's durable key/string storage, shared by every
//! browsing context in a group. It stores raw strings only; change broadcasting
//! and fallback handling live one layer up in [`KeyValueStore`](crate::KeyValueStore).
//!
//! Backends report failures (quota, unavailable storage) as errors. The store
//! decides what to do with them.

use std::fmt::Debug;

use crate::Result;

pub mod errors;
mod in_memory;

pub use errors::BackendError;
pub use in_memory::InMemory;

/// Durable key/string storage.
///
/// Implementations must be `Send + Sync`; one backend is shared by all
/// contexts opened on the same [`StorageArea`](crate::StorageArea).
pub trait StorageBackend: Send + Sync + Debug {
    /// Read the value stored under `key`, or `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// All stored keys, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;
}
