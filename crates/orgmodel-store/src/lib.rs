//! orgmodel store - SQLite persistence for the organisation model
//!
//! Provides:
//! - Embedded, checksummed schema migrations with named constraints
//! - A repository that writes a core `Store` to SQLite and hydrates it back
//! - Seed format v0 parser, digest and importer

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod seed;

// Re-export key types
pub use config::{JournalMode, StoreConfig};
pub use errors::Result;
