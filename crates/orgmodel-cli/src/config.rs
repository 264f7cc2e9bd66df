//! Layered CLI configuration
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file,
//! `ORGMODEL__*` environment variables, then command-line flags.

use config::{Config, ConfigError, Environment, File};
use orgmodel_core::logging_facility::Profile;
use orgmodel_store::StoreConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Read when `--config` is not given; may be absent
pub const DEFAULT_CONFIG_FILE: &str = "orgmodel.toml";

/// `ORGMODEL__STORE__PATH` maps to `store.path`
pub const ENV_PREFIX: &str = "ORGMODEL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub profile: Profile,
}

impl AppConfig {
    /// Command-line flags win over every other source
    pub fn apply_overrides(&mut self, db: Option<PathBuf>, log: Option<Profile>) {
        if let Some(path) = db {
            self.store.path = path;
        }
        if let Some(profile) = log {
            self.log.profile = profile;
        }
    }
}

/// Load the configuration
///
/// An explicit `path` must exist; the default file is optional.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (file, required) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    Config::builder()
        .add_source(File::from(file.as_path()).required(required))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgmodel_store::JournalMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_sources() {
        let config = AppConfig::default();
        assert_eq!(config.store.path, PathBuf::from(".orgmodel/orgmodel.db"));
        assert_eq!(config.store.journal_mode, JournalMode::Wal);
        assert_eq!(config.log.profile, Profile::Development);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            "[store]\npath = \"data/org.db\"\njournal_mode = \"delete\"\n\n[log]\nprofile = \"production\"\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.store.path, PathBuf::from("data/org.db"));
        assert_eq!(config.store.journal_mode, JournalMode::Delete);
        assert_eq!(config.log.profile, Profile::Production);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.toml");
        fs::write(&path, "[log]\nprofile = \"production\"\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut config = AppConfig::default();
        config.apply_overrides(Some(PathBuf::from("flag.db")), Some(Profile::Production));
        assert_eq!(config.store.path, PathBuf::from("flag.db"));
        assert_eq!(config.log.profile, Profile::Production);

        config.apply_overrides(None, None);
        assert_eq!(config.store.path, PathBuf::from("flag.db"));
    }
}
