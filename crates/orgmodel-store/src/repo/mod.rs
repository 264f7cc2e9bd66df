//! Repository layer for persisting the organisation model to SQLite
//!
//! Bridges the in-memory core `Store` to SQLite persistence

mod columns;
pub mod hydration;
pub mod sqlite_repo;

pub use hydration::load_store;
pub use sqlite_repo::SqliteRepo;
