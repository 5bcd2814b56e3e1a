//! Runtime settings, read from an optional TOML file and `CIVIC_*`
//! environment variables (the latter win).

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
  /// SQLite database file; a leading `~/` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path:      PathBuf,
  /// How long a write waits on another writer's lock.
  #[serde(default = "default_busy_timeout_ms")]
  pub busy_timeout_ms: u64,
}

fn default_store_path() -> PathBuf { PathBuf::from("civic.sqlite3") }

fn default_busy_timeout_ms() -> u64 { 5_000 }

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("CIVIC"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }

  pub fn busy_timeout(&self) -> Duration {
    Duration::from_millis(self.busy_timeout_ms)
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(settings.busy_timeout(), Duration::from_secs(5));
  }

  #[test]
  fn file_values_are_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("civic.toml");
    std::fs::write(
      &path,
      "store_path = \"/var/lib/civic/reports.sqlite3\"\nbusy_timeout_ms = 250\n",
    )
    .unwrap();

    let settings = Settings::load(&path).unwrap();
    assert_eq!(
      settings.store_path(),
      PathBuf::from("/var/lib/civic/reports.sqlite3")
    );
    assert_eq!(settings.busy_timeout(), Duration::from_millis(250));
  }

  #[test]
  fn relative_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("data/x.db")), PathBuf::from("data/x.db"));
  }
}
