//! Read-only analytics over completed-session history. Every function here
//! is pure and synchronous: immutable inputs, fresh derived outputs, safe to
//! call repeatedly and concurrently.

use serde::{Deserialize, Serialize};

pub mod behavior;
pub mod consistency;
pub mod trajectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Suggestion,
}

/// A severity-tagged, human-readable recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub message: String,
}

impl Recommendation {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}
