//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums and drift detection
//! - Idempotent application
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations, AppliedMigration};
