//! Loading service configuration from TOML, with env-var overrides.
//!
//! Schema (every key optional):
//!
//! ```toml
//! [server]
//! port = 3000
//!
//! [storage]
//! backend = "file"        # or "memory"
//! data_dir = "./data"
//!
//! [catalog]
//! graphql_url = "https://leetcode.com/graphql/"
//! referer = "https://leetcode.com"
//! problems_url = "https://leetcode.com/problems"
//! timeout_secs = 20
//! page_limit = 5000
//!
//! [sampling]
//! seed = 42               # fixed seed for reproducible picks
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info, warn};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub server: ServerCfg,
  #[serde(default)]
  pub storage: StorageCfg,
  #[serde(default)]
  pub catalog: CatalogCfg,
  #[serde(default)]
  pub sampling: SamplingCfg,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
  pub port: u16,
}

impl Default for ServerCfg {
  fn default() -> Self { Self { port: 3000 } }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
  File,
  Memory,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StorageCfg {
  pub backend: StorageBackend,
  pub data_dir: PathBuf,
}

impl Default for StorageCfg {
  fn default() -> Self {
    Self { backend: StorageBackend::File, data_dir: PathBuf::from("./data") }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CatalogCfg {
  pub graphql_url: String,
  pub referer: String,
  pub problems_url: String,
  pub timeout_secs: u64,
  pub page_limit: u32,
}

impl Default for CatalogCfg {
  fn default() -> Self {
    Self {
      graphql_url: "https://leetcode.com/graphql/".into(),
      referer: "https://leetcode.com".into(),
      problems_url: "https://leetcode.com/problems".into(),
      timeout_secs: 20,
      page_limit: 5000,
    }
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
#[serde(default)]
pub struct SamplingCfg {
  pub seed: Option<u64>,
}

impl AppConfig {
  /// Read `LEETDAILY_CONFIG_PATH` (if set) and then apply env overrides.
  /// A missing or unparsable file falls back to defaults.
  pub fn load() -> Self {
    let mut cfg = load_config_file_from_env().unwrap_or_default();
    cfg.apply_env(|k| std::env::var(k).ok());
    cfg
  }

  /// Override fields from the given variable lookup.
  pub fn apply_env<F>(&mut self, var: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(port) = parse_var(&var, "PORT") {
      self.server.port = port;
    }
    if let Some(dir) = var("DATA_DIR") {
      self.storage.data_dir = PathBuf::from(dir);
    }
    match var("STORAGE_BACKEND").as_deref() {
      Some("memory") => self.storage.backend = StorageBackend::Memory,
      Some("file") => self.storage.backend = StorageBackend::File,
      Some(other) => warn!(target: "leetdaily", value = %other, "Unknown STORAGE_BACKEND; keeping configured backend"),
      None => {}
    }
    if let Some(url) = var("LEETCODE_GRAPHQL_URL") {
      self.catalog.graphql_url = url;
    }
    if let Some(secs) = parse_var(&var, "FETCH_TIMEOUT_SECS") {
      self.catalog.timeout_secs = secs;
    }
    if let Some(seed) = parse_var(&var, "SAMPLING_SEED") {
      self.sampling.seed = Some(seed);
    }
  }
}

fn parse_var<F, T>(var: &F, key: &str) -> Option<T>
where
  F: Fn(&str) -> Option<String>,
  T: std::str::FromStr,
{
  let raw = var(key)?;
  match raw.trim().parse::<T>() {
    Ok(v) => Some(v),
    Err(_) => {
      warn!(target: "leetdaily", %key, value = %raw, "Ignoring unparsable env override");
      None
    }
  }
}

fn load_config_file_from_env() -> Option<AppConfig> {
  let path = std::env::var("LEETDAILY_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "leetdaily", %path, "Loaded config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "leetdaily", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "leetdaily", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg: AppConfig = toml::from_str(
      r#"
        [storage]
        backend = "memory"

        [catalog]
        timeout_secs = 5

        [sampling]
        seed = 9
      "#,
    )
    .unwrap();
    assert_eq!(cfg.server.port, 3000);
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.storage.data_dir, PathBuf::from("./data"));
    assert_eq!(cfg.catalog.timeout_secs, 5);
    assert_eq!(cfg.catalog.graphql_url, "https://leetcode.com/graphql/");
    assert_eq!(cfg.sampling.seed, Some(9));
  }

  #[test]
  fn env_overrides_win_and_bad_values_are_ignored() {
    let env: HashMap<&str, &str> = [
      ("PORT", "8081"),
      ("DATA_DIR", "/var/lib/leetdaily"),
      ("STORAGE_BACKEND", "memory"),
      ("FETCH_TIMEOUT_SECS", "soon"),
      ("SAMPLING_SEED", "123"),
    ]
    .into_iter()
    .collect();

    let mut cfg = AppConfig::default();
    cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));

    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.storage.data_dir, PathBuf::from("/var/lib/leetdaily"));
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.catalog.timeout_secs, 20);
    assert_eq!(cfg.sampling.seed, Some(123));
  }
}
