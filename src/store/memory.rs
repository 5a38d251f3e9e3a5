use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::UserStore;
use crate::domain::UserId;
use crate::error::StoreError;

/// In-process store. Each save swaps one map entry under the write lock.
#[derive(Clone)]
pub struct MemoryStore<T> {
  entries: Arc<RwLock<HashMap<UserId, T>>>,
}

impl<T> MemoryStore<T> {
  pub fn new() -> Self {
    Self { entries: Arc::new(RwLock::new(HashMap::new())) }
  }
}

impl<T> Default for MemoryStore<T> {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl<T> UserStore<T> for MemoryStore<T>
where
  T: Clone + Send + Sync + 'static,
{
  async fn load(&self, user: &UserId) -> Option<T> {
    self.entries.read().await.get(user).cloned()
  }

  async fn save(&self, user: &UserId, value: &T) -> Result<(), StoreError> {
    self.entries.write().await.insert(user.clone(), value.clone());
    Ok(())
  }
}
