//! Store configuration
//!
//! Deserialized from the CLI's layered configuration (`[store]` table).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default database location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = ".orgmodel/orgmodel.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub journal_mode: JournalMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_PATH),
            journal_mode: JournalMode::default(),
        }
    }
}

/// SQLite journal mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    #[default]
    Wal,
    Delete,
    Memory,
}

impl JournalMode {
    pub fn pragma_value(&self) -> &'static str {
        match self {
            JournalMode::Wal => "WAL",
            JournalMode::Delete => "DELETE",
            JournalMode::Memory => "MEMORY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.path, PathBuf::from(".orgmodel/orgmodel.db"));
        assert_eq!(config.journal_mode, JournalMode::Wal);
    }

    #[test]
    fn test_journal_mode_deserializes_lowercase() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"path": "x.db", "journal_mode": "delete"}"#).unwrap();
        assert_eq!(config.journal_mode, JournalMode::Delete);
        assert_eq!(config.path, PathBuf::from("x.db"));
    }
}
