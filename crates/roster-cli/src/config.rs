//! Layered configuration: defaults, then the TOML file, then `ROSTER_*`
//! environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
  /// Where the roster document lives.
  #[serde(default = "default_data_path")]
  pub data_path: PathBuf,
  /// Default log level when `RUST_LOG` is unset.
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

fn default_data_path() -> PathBuf { PathBuf::from("data/roster.json") }

fn default_log_level() -> String { "info".to_string() }

impl Default for CliConfig {
  fn default() -> Self {
    Self { data_path: default_data_path(), log_level: default_log_level() }
  }
}

impl CliConfig {
  /// Read `path` (optional) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("ROSTER"))
      .build()
      .context("failed to read config file")?;

    let mut cfg: CliConfig = settings
      .try_deserialize()
      .context("failed to deserialise CliConfig")?;
    cfg.data_path = expand_tilde(&cfg.data_path);
    Ok(cfg)
  }
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
