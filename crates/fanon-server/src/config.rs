//! Server configuration, loaded from `config.toml` and `FANON_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// Path to the SQLite database file. A leading `~` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("fanon.db") }

/// Layer the TOML file (optional) under `FANON_*` environment
/// variables.
pub fn load(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = ::config::Config::builder()
    .add_source(::config::File::from(path.to_path_buf()).required(false))
    .add_source(::config::Environment::with_prefix("FANON"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}
