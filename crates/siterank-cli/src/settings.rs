//! Runtime settings, read from a TOML file and `SITERANK_*` environment
//! variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  /// SQLite database file.
  pub store_path:  PathBuf,
  /// Staging log consumed by the ranking job.
  pub staging_log: PathBuf,
  /// Reference dataset used by `load` when no path is given.
  #[serde(default)]
  pub dataset:     Option<PathBuf>,
}

impl Settings {
  /// Layer `path` (optional) and the environment over the defaults.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .set_default("store_path", "siterank.db")?
      .set_default("staging_log", "to_be_inserted_into_ranking.txt")?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SITERANK"))
      .build()
      .context("failed to read config file")?;

    let mut settings: Settings = settings
      .try_deserialize()
      .context("failed to deserialise Settings")?;
    settings.store_path = expand_tilde(&settings.store_path);
    settings.staging_log = expand_tilde(&settings.staging_log);
    settings.dataset = settings.dataset.as_deref().map(expand_tilde);
    Ok(settings)
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
