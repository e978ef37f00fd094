//! Newtype wrappers and type aliases for domain concepts.
//!
//! Process identities are strings in workload files, so `Pid` wraps a
//! `String` and orders lexicographically. That ordering is the final
//! tie-breaker everywhere the simulator needs a deterministic choice.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub String);

impl Pid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Pid {
    fn from(s: &str) -> Self {
        Pid(s.to_string())
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Simulated time in milliseconds.
pub type TimeMs = u64;
