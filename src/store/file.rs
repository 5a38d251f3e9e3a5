//! One JSON document per user under `<root>/<namespace>/`.
//!
//! Writes go to a uniquely named temp file in the same directory and are then
//! renamed over the target, so a reader sees either the old or the new value
//! and concurrent writers for different users never share a file.

use std::{
  io::ErrorKind,
  marker::PhantomData,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::UserStore;
use crate::domain::UserId;
use crate::error::StoreError;

pub struct JsonFileStore<T> {
  dir: PathBuf,
  _value: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
  /// The directory is created lazily on first save.
  pub fn new(root: impl AsRef<Path>, namespace: &str) -> Self {
    Self { dir: root.as_ref().join(namespace), _value: PhantomData }
  }

  fn path_for(&self, user: &UserId) -> PathBuf {
    self.dir.join(format!("{}.json", encode_key(user.as_str())))
  }
}

/// Longest escaped key kept as a file name; leaves room for ".json" and the
/// temp-file prefix under the common 255-byte name limit.
const MAX_ENCODED_KEY: usize = 200;

/// File-name-safe encoding: ASCII alphanumerics, '-' and '_' pass through,
/// every other byte becomes `%XX`. Keys that would escape past
/// `MAX_ENCODED_KEY` become `~sha256-<hex>` of the raw id instead. '~' never
/// appears in an escaped key, so the two forms cannot collide.
pub fn encode_key(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for b in raw.bytes() {
    if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
      out.push(b as char);
    } else {
      out.push_str(&format!("%{:02X}", b));
    }
  }
  if out.len() > MAX_ENCODED_KEY {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    return format!("~sha256-{:x}", hasher.finalize());
  }
  out
}

#[async_trait]
impl<T> UserStore<T> for JsonFileStore<T>
where
  T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
  #[instrument(level = "debug", skip(self), fields(%user))]
  async fn load(&self, user: &UserId) -> Option<T> {
    let path = self.path_for(user);
    let bytes = match tokio::fs::read(&path).await {
      Ok(b) => b,
      Err(e) if e.kind() == ErrorKind::NotFound => return None,
      Err(e) => {
        warn!(target: "store", path = %path.display(), error = %e, "Unreadable entry; treating as absent");
        return None;
      }
    };
    match serde_json::from_slice::<T>(&bytes) {
      Ok(v) => Some(v),
      Err(e) => {
        warn!(target: "store", path = %path.display(), error = %e, "Malformed entry; treating as absent");
        None
      }
    }
  }

  #[instrument(level = "debug", skip(self, value), fields(%user))]
  async fn save(&self, user: &UserId, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::create_dir_all(&self.dir).await?;

    let target = self.path_for(user);
    let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
    tokio::fs::write(&tmp, &json).await?;
    if let Err(e) = tokio::fs::rename(&tmp, &target).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(e.into());
    }
    debug!(target: "store", path = %target.display(), bytes = json.len(), "Entry written");
    Ok(())
  }
}
