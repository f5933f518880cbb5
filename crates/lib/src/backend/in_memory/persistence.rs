//! Persistence operations for the InMemory backend
//!
//! Saves and loads the entry map to/from a versioned JSON file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::PoisonError;

use serde::{Deserialize, Deserializer, Serialize};

use super::InMemory;
use crate::{Error, Result, backend::errors::BackendError};

/// The current persistence file format version.
/// v0 indicates this is an unstable format subject to breaking changes.
const PERSISTENCE_VERSION: u8 = 0;

fn is_v0(v: &u8) -> bool {
    *v == 0
}

fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

#[derive(Serialize, Deserialize)]
struct SerializableStorage {
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default)]
    items: HashMap<String, String>,
}

pub(crate) async fn save_to_file<P: AsRef<Path>>(backend: &InMemory, path: P) -> Result<()> {
    let items = backend
        .items
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    let serializable = SerializableStorage {
        version: PERSISTENCE_VERSION,
        items,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { BackendError::SerializationFailed { source: e }.into() })?;

    tokio::fs::write(path, json)
        .await
        .map_err(|e| BackendError::FileIo { source: e }.into())
}

pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemory> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => {
            let stored: SerializableStorage = serde_json::from_str(&json)
                .map_err(|e| -> Error { BackendError::DeserializationFailed { source: e }.into() })?;
            let backend = InMemory::new();
            *backend
                .items
                .write()
                .unwrap_or_else(PoisonError::into_inner) = stored.items;
            Ok(backend)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(BackendError::FileIo { source: e }.into()),
    }
}
