//! Correlation ids
//!
//! Each CLI invocation gets one `RequestContext`. Its id is recorded on the
//! invocation's tracing span and on any `ExError` it reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time-ordered identifier of one invocation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What one invocation is doing, and under which id
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: RequestId,
    pub command: &'static str,
}

impl RequestContext {
    pub fn new(command: &'static str) -> Self {
        Self {
            request_id: RequestId::new(),
            command,
        }
    }
}
