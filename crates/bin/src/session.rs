//! One CLI invocation's view of the persisted state.
//!
//! Loads the JSON file into an in-memory backend, opens a context on it,
//! hydrates the master controller, and writes everything back on
//! [`Session::save`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kobllux::backend::{InMemory, StorageBackend};
use kobllux::{KeyValueStore, MasterController, StorageArea, SyncConfig, VaultState};

const DATA_FILE: &str = "kobllux.json";

pub struct Session {
    backend: Arc<InMemory>,
    path: PathBuf,
    pub store: KeyValueStore,
    pub controller: MasterController,
}

impl Session {
    /// Open the state under `data_dir` (or the working directory).
    ///
    /// An encrypted bundle is unlocked with `passphrase` when one is given.
    pub async fn open(
        data_dir: Option<&Path>,
        passphrase: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match data_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                dir.join(DATA_FILE)
            }
            None => PathBuf::from(DATA_FILE),
        };

        let backend = Arc::new(InMemory::load_from_file(&path).await?);
        tracing::debug!(path = %path.display(), "loaded state");

        let shared: Arc<dyn StorageBackend> = backend.clone();
        let store = StorageArea::from_shared(shared, SyncConfig::default()).open_context();
        store.seed_defaults();

        let mut controller = MasterController::new(store.clone());
        let state = controller.hydrate()?;
        if state == VaultState::Locked
            && let Some(passphrase) = passphrase
        {
            controller.unlock(passphrase).await?;
            tracing::info!("vault unlocked");
        }

        Ok(Self {
            backend,
            path,
            store,
            controller,
        })
    }

    /// Write the credential bundle (if the vault is readable) and the file.
    pub async fn save(&mut self, credentials_changed: bool) -> Result<(), Box<dyn std::error::Error>> {
        if credentials_changed {
            self.controller.persist().await?;
        }
        self.backend.save_to_file(&self.path).await?;
        tracing::debug!(path = %self.path.display(), "saved state");
        Ok(())
    }
}
