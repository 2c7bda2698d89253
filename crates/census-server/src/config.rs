//! Server configuration, layered from a TOML file and `CENSUS_*` variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

/// Store path that selects a throwaway in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:         String,
  pub port:         u16,
  pub store_path:   PathBuf,
  /// Origins allowed by CORS. Empty disables the CORS layer.
  pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:         "127.0.0.1".to_string(),
      port:         5000,
      store_path:   PathBuf::from(IN_MEMORY),
      cors_origins: Vec::new(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and overlay `CENSUS_*` environment variables.
  ///
  /// `CENSUS_CORS_ORIGINS` takes a comma-separated list.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("CENSUS")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn in_memory(&self) -> bool { self.store_path == Path::new(IN_MEMORY) }

  /// `host:port` for the listener.
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
