//! Runtime server configuration.
//!
//! Read from an optional TOML file, then overridden by `AGENDA_*` environment
//! variables (e.g. `AGENDA_DATABASE_URL`, `AGENDA_API_KEY`).

use std::{path::PathBuf, time::Duration};

use agenda_core::{directory::DirectoryConfig, upstream::ApiKey};
use agenda_ninjas::{DEFAULT_BASE_URL, NinjasConfig};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use serde::Deserialize;

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  /// SQLite database path. Required; `:memory:` is accepted.
  pub database_url:         PathBuf,
  /// API Ninjas credential. Only contact writes fail without it.
  #[serde(default)]
  pub api_key:              Option<String>,
  #[serde(default = "default_ninjas_base_url")]
  pub ninjas_base_url:      String,
  #[serde(default = "default_request_timeout_secs")]
  pub request_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 4000 }

fn default_ninjas_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_request_timeout_secs() -> u64 { 30 }

impl ServerConfig {
  /// Layer `path` (if it exists) under the `AGENDA_*` environment.
  pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(Environment::with_prefix("AGENDA")),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    let cfg: Self = builder.build()?.try_deserialize()?;
    if cfg.request_timeout_secs == 0 {
      return Err(ConfigError::Message("request_timeout_secs must be at least 1".to_owned()));
    }
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn directory_config(&self) -> DirectoryConfig {
    DirectoryConfig {
      api_key: self
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .map(ApiKey::new),
    }
  }

  pub fn ninjas_config(&self) -> NinjasConfig {
    NinjasConfig {
      base_url: self.ninjas_base_url.clone(),
      timeout:  Duration::from_secs(self.request_timeout_secs),
    }
  }
}
