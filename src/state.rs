//! Application state: the orchestrator wired to its stores and fetcher.
//!
//! This module owns backend selection (in-memory vs one-file-per-user JSON)
//! and the catalog client construction. Handlers only see `AppState`.

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::config::{AppConfig, StorageBackend};
use crate::domain::{Credential, Preference, Snapshot};
use crate::error::FetchError;
use crate::fetcher::{CatalogFetcher, LeetCodeFetcher};
use crate::orchestrator::Orchestrator;
use crate::store::{CredentialStore, JsonFileStore, MemoryStore, PreferenceStore, SnapshotStore};

pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Base for canonical problem links.
    pub problems_url: String,
}

impl AppState {
    /// Build state from config: pick the storage backend and the catalog client.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(cfg: &AppConfig) -> Result<Self, FetchError> {
        let fetcher: Arc<dyn CatalogFetcher> = Arc::new(LeetCodeFetcher::from_config(&cfg.catalog)?);
        info!(target: "leetdaily", url = %cfg.catalog.graphql_url, timeout_secs = cfg.catalog.timeout_secs, "Catalog client ready");
        Ok(Self::with_fetcher(cfg, fetcher))
    }

    /// Same as `from_config` with an explicit catalog provider.
    pub fn with_fetcher(cfg: &AppConfig, fetcher: Arc<dyn CatalogFetcher>) -> Self {
        let (snapshots, preferences, credentials) = match cfg.storage.backend {
            StorageBackend::Memory => {
                info!(target: "leetdaily", "Using in-memory stores; state is lost on restart");
                (
                    SnapshotStore::new(Arc::new(MemoryStore::<Snapshot>::new())),
                    PreferenceStore::new(Arc::new(MemoryStore::<Preference>::new())),
                    CredentialStore::new(Arc::new(MemoryStore::<Credential>::new())),
                )
            }
            StorageBackend::File => {
                let dir = &cfg.storage.data_dir;
                info!(target: "leetdaily", data_dir = %dir.display(), "Using per-user JSON file stores");
                (
                    SnapshotStore::new(Arc::new(JsonFileStore::<Snapshot>::new(dir, "snapshots"))),
                    PreferenceStore::new(Arc::new(JsonFileStore::<Preference>::new(dir, "preferences"))),
                    CredentialStore::new(Arc::new(JsonFileStore::<Credential>::new(dir, "credentials"))),
                )
            }
        };

        if let Some(seed) = cfg.sampling.seed {
            info!(target: "leetdaily", seed, "Sampling with a fixed seed");
        }

        let orchestrator = Orchestrator::new(
            snapshots,
            preferences,
            credentials,
            fetcher,
            Duration::from_secs(cfg.catalog.timeout_secs),
            cfg.sampling.seed,
        );

        Self { orchestrator, problems_url: cfg.catalog.problems_url.clone() }
    }
}
