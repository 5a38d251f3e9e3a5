//! Session orchestration over the stores, the selector and the catalog fetcher.
//!
//! Each operation is independent; the only state shared across calls lives in
//! the stores. Callers are expected to serialize requests for the same user.

use std::{sync::Arc, time::Duration};

use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::domain::{Credential, Preference, ProblemRecord, TierCounts, UserId};
use crate::error::{FetchError, ServiceError, ServiceResult};
use crate::fetcher::CatalogFetcher;
use crate::selector::select;
use crate::store::{CredentialStore, PreferenceStore, SnapshotStore};

/// Sizes of the two partitions written by a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshCounts {
  pub not_solved: usize,
  pub solved: usize,
}

pub struct Orchestrator {
  snapshots: SnapshotStore,
  preferences: PreferenceStore,
  credentials: CredentialStore,
  fetcher: Arc<dyn CatalogFetcher>,
  fetch_timeout: Duration,
  rng: Mutex<StdRng>,
}

impl Orchestrator {
  /// `seed` fixes the sampling sequence; `None` seeds from OS entropy.
  pub fn new(
    snapshots: SnapshotStore,
    preferences: PreferenceStore,
    credentials: CredentialStore,
    fetcher: Arc<dyn CatalogFetcher>,
    fetch_timeout: Duration,
    seed: Option<u64>,
  ) -> Self {
    let rng = match seed {
      Some(s) => StdRng::seed_from_u64(s),
      None => StdRng::from_entropy(),
    };
    Self { snapshots, preferences, credentials, fetcher, fetch_timeout, rng: Mutex::new(rng) }
  }

  /// Today's picks from the cached not-solved partition.
  #[instrument(level = "info", skip(self), fields(%user))]
  pub async fn today_selection(&self, user: &UserId) -> ServiceResult<Vec<ProblemRecord>> {
    let pool = self.snapshots.get_not_solved(user).await;
    let Some(pref) = self.preferences.get(user).await else {
      warn!(target: "leetdaily", %user, "Selection requested before preferences were set");
      return Err(ServiceError::ConfigurationMissing);
    };

    let picked = {
      let mut rng = self.rng.lock().await;
      select(&pool, &pref, &mut *rng)
    };
    info!(target: "leetdaily", %user, pool = pool.len(), requested = pref.count_by_difficulty.total(), picked = picked.len(), "Daily selection drawn");
    Ok(picked)
  }

  /// Fetch the full catalog and replace the user's snapshot. Nothing is
  /// written unless the fetch produced at least one record.
  #[instrument(level = "info", skip(self), fields(%user))]
  pub async fn refresh_catalog(&self, user: &UserId) -> ServiceResult<RefreshCounts> {
    let credential = self.credentials.get(user).await.ok_or(ServiceError::CredentialMissing)?;

    let fetched = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&credential)).await {
      Ok(res) => res,
      Err(_) => Err(FetchError::Timeout(self.fetch_timeout)),
    };
    let records = match fetched {
      Ok(r) if !r.is_empty() => r,
      Ok(_) => return Err(self.fetch_failed(user, FetchError::Empty)),
      Err(e) => return Err(self.fetch_failed(user, e)),
    };

    let snapshot = self.snapshots.put(user, records).await?;
    Ok(RefreshCounts { not_solved: snapshot.not_solved.len(), solved: snapshot.solved.len() })
  }

  fn fetch_failed(&self, user: &UserId, e: FetchError) -> ServiceError {
    error!(target: "leetdaily", %user, error = %e, "Catalog refresh failed; snapshot left unchanged");
    ServiceError::FetchFailed(e)
  }

  #[instrument(level = "info", skip(self), fields(%user))]
  pub async fn set_preference(&self, user: &UserId, preference: Preference) -> ServiceResult<()> {
    self.preferences.put(user, preference).await?;
    info!(target: "leetdaily", %user, ?preference, "Preferences saved");
    Ok(())
  }

  #[instrument(level = "info", skip(self, token), fields(%user, token_len = token.len()))]
  pub async fn set_credential(&self, user: &UserId, token: &str) -> ServiceResult<()> {
    let token = token.trim();
    if token.is_empty() {
      warn!(target: "leetdaily", %user, "Rejected blank credential");
      return Err(ServiceError::BlankCredential);
    }
    self.credentials.put(user, Credential::new(token)).await?;
    info!(target: "leetdaily", %user, "Credential saved");
    Ok(())
  }

  /// Solved tally by tier, from the latest snapshot only.
  #[instrument(level = "debug", skip(self), fields(%user))]
  pub async fn solved_counts(&self, user: &UserId) -> TierCounts {
    let solved = self.snapshots.get_solved(user).await;
    TierCounts::tally(&solved)
  }
}
