//! On-disk config store.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::types::Config;

/// Load/save access to the persisted [`Config`].
///
/// The login flow and the connection both write tokens back through this
/// trait, so tests can substitute a store rooted in a temp directory.
pub trait ConfigStore: Send + Sync {
    /// Read the config, returning defaults when no file exists yet.
    fn load(&self) -> Result<Config, ConfigError>;
    /// Persist the config.
    fn save(&self, config: &Config) -> Result<(), ConfigError>;
}

/// Resolve the config file location.
///
/// Checks `STRATA_CONFIG`, then `$XDG_CONFIG_HOME/strata/config.json`,
/// falling back to `~/.config/strata/config.json`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = std::env::var("STRATA_CONFIG") {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(base.join("strata").join("config.json"))
}

/// JSON file-backed [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Store at the default location (see [`config_path`]).
    pub fn from_default_path() -> Result<Self, ConfigError> {
        Ok(Self::new(config_path()?))
    }

    /// Store at an explicit location.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(Config::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|_| ConfigError::CreateDir(parent.to_path_buf()))?;
        }
        let raw = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, raw)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TokenPair;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("nested").join("config.json"));

        let mut cfg = Config::default();
        cfg.tokens = TokenPair {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
        };
        cfg.api_url = "https://api.strata.cloud".to_string();

        store.save(&cfg).unwrap();
        assert_eq!(store.load().unwrap(), cfg);
    }

    #[test]
    fn test_save_overwrites_previous() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileConfigStore::new(dir.path().join("config.json"));

        let mut cfg = Config::default();
        cfg.client_id = "first".to_string();
        store.save(&cfg).unwrap();

        cfg.client_id = "second".to_string();
        store.save(&cfg).unwrap();

        assert_eq!(store.load().unwrap().client_id, "second");
    }
}
