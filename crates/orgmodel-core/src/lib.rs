//! orgmodel core - domain model of the organisation-management system
//!
//! This crate provides:
//! - Entities for organisations, users, memberships, groups and guilds,
//!   activities and admissions, awards, foods and allergies
//! - Localized text: locales, text suites and locale-parameterized ordering
//! - Deterministic natural orderings for every entity
//! - An in-memory `Store` that assigns identities from per-entity sequences and
//!   enforces the named unique and foreign key constraints
//! - The error facility (`OrgError`, `ExError`) and the logging facility

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, OrgError, Result};
pub use model::{
    Identity, Locale, LocaleDefinition, Localizable, LocalizedComparable, NaturalOrder, TextSuite,
};
pub use ops::{Association, Entity, Store};
