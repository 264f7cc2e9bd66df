//! Database connection management
//!
//! Provides utilities for opening and managing SQLite connections

use crate::config::{JournalMode, StoreConfig};
use crate::errors::{from_rusqlite, io_error, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Open the database named by `config`, creating its parent directory.
pub fn open_configured(config: &StoreConfig) -> Result<Connection> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
        }
    }
    let conn = open(&config.path)?;
    configure(&conn, config.journal_mode)?;
    Ok(conn)
}

/// Configure a connection: foreign keys on, journal mode as given
pub fn configure(conn: &Connection, journal_mode: JournalMode) -> Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])
        .map_err(from_rusqlite)?;

    // journal_mode reports the resulting mode as a row
    let pragma = format!("PRAGMA journal_mode = {}", journal_mode.pragma_value());
    conn.query_row(&pragma, [], |_| Ok(()))
        .map_err(from_rusqlite)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_enables_foreign_keys() {
        let conn = open_in_memory().unwrap();
        configure(&conn, JournalMode::Memory).unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_open_configured_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            path: dir.path().join("nested").join("org.db"),
            journal_mode: JournalMode::Delete,
        };
        open_configured(&config).unwrap();
        assert!(config.path.exists());
    }
}
