//! Simulation configuration.
//!
//! One [`SimConfig`] value is handed to every run. It is validated when a
//! [`Simulator`](crate::Simulator) is constructed, so a bad configuration
//! never starts a run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::TimeMs;

/// Default context-switch cost.
pub const DEFAULT_CONTEXT_SWITCH_MS: TimeMs = 8;

/// Default Round-Robin time slice.
pub const DEFAULT_TIME_SLICE_MS: TimeMs = 80;

/// Where Round-Robin re-queues a process whose time slice expired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RrAdd {
    /// Append to the tail of the ready queue.
    #[default]
    End,
    /// Push to the head of the ready queue.
    Beginning,
}

impl FromStr for RrAdd {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "END" | "end" => Ok(RrAdd::End),
            "BEGINNING" | "beginning" => Ok(RrAdd::Beginning),
            other => Err(ConfigError::InvalidRrAdd(other.to_string())),
        }
    }
}

impl fmt::Display for RrAdd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RrAdd::End => f.write_str("END"),
            RrAdd::Beginning => f.write_str("BEGINNING"),
        }
    }
}

/// Errors from validating a [`SimConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The Round-Robin time slice must be at least 1ms.
    ZeroTimeSlice,
    /// The context-switch cost must split into two whole-millisecond halves.
    OddContextSwitch(TimeMs),
    /// Unknown ready-queue insertion mode.
    InvalidRrAdd(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroTimeSlice => write!(f, "time slice must be at least 1ms"),
            ConfigError::OddContextSwitch(ms) => {
                write!(f, "context switch cost must be even, got {ms}ms")
            }
            ConfigError::InvalidRrAdd(s) => {
                write!(f, "invalid rr-add mode {s:?} (expected BEGINNING or END)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parameters shared by every policy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Full cost of one context switch, charged half on switch-in and
    /// half on switch-out.
    pub context_switch_ms: TimeMs,
    /// Round-Robin quantum.
    pub time_slice_ms: TimeMs,
    /// Round-Robin re-queue position after slice expiry.
    pub rr_add: RrAdd,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            context_switch_ms: DEFAULT_CONTEXT_SWITCH_MS,
            time_slice_ms: DEFAULT_TIME_SLICE_MS,
            rr_add: RrAdd::End,
        }
    }
}

impl SimConfig {
    pub fn context_switch_ms(mut self, ms: TimeMs) -> Self {
        self.context_switch_ms = ms;
        self
    }

    pub fn time_slice_ms(mut self, ms: TimeMs) -> Self {
        self.time_slice_ms = ms;
        self
    }

    pub fn rr_add(mut self, mode: RrAdd) -> Self {
        self.rr_add = mode;
        self
    }

    /// Half of the context-switch cost.
    pub fn cs_half(&self) -> TimeMs {
        self.context_switch_ms / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_slice_ms == 0 {
            return Err(ConfigError::ZeroTimeSlice);
        }
        if self.context_switch_ms % 2 != 0 {
            return Err(ConfigError::OddContextSwitch(self.context_switch_ms));
        }
        Ok(())
    }
}
