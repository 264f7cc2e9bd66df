//! Core types shared across the orgmodel facilities
//!
//! Leaf types used by both the error and logging facilities:
//!
//! - **Correlation types**: RequestId, RequestContext
//! - **Sensitive data**: `Sensitive<T>` wrapper for personal data that must never be logged
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;
pub mod sensitive;

pub use correlation::{RequestContext, RequestId};
pub use sensitive::Sensitive;
