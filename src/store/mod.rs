//! Per-user keyed persistence.
//!
//! `UserStore<T>` is the storage seam: one value per user, replaced whole on
//! every save, never touching other users' entries. Two backends exist:
//!   - `MemoryStore` (tests, ephemeral deployments)
//!   - `JsonFileStore` (one JSON file per user, atomic rename on write)
//!
//! The typed stores on top (`SnapshotStore`, `PreferenceStore`,
//! `CredentialStore`) own the domain rules and are what the orchestrator uses.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::domain::{Credential, Preference, ProblemRecord, Snapshot, UserId};
use crate::error::StoreError;

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Missing and unreadable entries both come back as `None`.
#[async_trait]
pub trait UserStore<T>: Send + Sync {
  async fn load(&self, user: &UserId) -> Option<T>;
  async fn save(&self, user: &UserId, value: &T) -> Result<(), StoreError>;
}

/// Latest catalog snapshot per user.
#[derive(Clone)]
pub struct SnapshotStore {
  inner: Arc<dyn UserStore<Snapshot>>,
}

impl SnapshotStore {
  pub fn new(inner: Arc<dyn UserStore<Snapshot>>) -> Self {
    Self { inner }
  }

  /// Partition `records`, persist both partitions in one write, return them.
  #[instrument(level = "info", skip(self, records), fields(%user, records = records.len()))]
  pub async fn put(&self, user: &UserId, records: Vec<ProblemRecord>) -> Result<Snapshot, StoreError> {
    let snapshot = Snapshot::partition(records);
    self.inner.save(user, &snapshot).await?;
    info!(target: "leetdaily", %user, not_solved = snapshot.not_solved.len(), solved = snapshot.solved.len(), "Snapshot replaced");
    Ok(snapshot)
  }

  pub async fn get_not_solved(&self, user: &UserId) -> Vec<ProblemRecord> {
    self.inner.load(user).await.map(|s| s.not_solved).unwrap_or_default()
  }

  pub async fn get_solved(&self, user: &UserId) -> Vec<ProblemRecord> {
    self.inner.load(user).await.map(|s| s.solved).unwrap_or_default()
  }
}

#[derive(Clone)]
pub struct PreferenceStore {
  inner: Arc<dyn UserStore<Preference>>,
}

impl PreferenceStore {
  pub fn new(inner: Arc<dyn UserStore<Preference>>) -> Self {
    Self { inner }
  }

  #[instrument(level = "debug", skip(self), fields(%user))]
  pub async fn put(&self, user: &UserId, preference: Preference) -> Result<(), StoreError> {
    self.inner.save(user, &preference).await
  }

  /// `None` means never configured, which is not the same as all zeros.
  pub async fn get(&self, user: &UserId) -> Option<Preference> {
    self.inner.load(user).await
  }
}

#[derive(Clone)]
pub struct CredentialStore {
  inner: Arc<dyn UserStore<Credential>>,
}

impl CredentialStore {
  pub fn new(inner: Arc<dyn UserStore<Credential>>) -> Self {
    Self { inner }
  }

  #[instrument(level = "debug", skip(self, credential), fields(%user))]
  pub async fn put(&self, user: &UserId, credential: Credential) -> Result<(), StoreError> {
    self.inner.save(user, &credential).await
  }

  pub async fn get(&self, user: &UserId) -> Option<Credential> {
    self.inner.load(user).await
  }
}
