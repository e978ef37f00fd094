//! cpusim - Deterministic tick-driven CPU scheduling simulator.
//!
//! Replays a workload of processes (CPU bursts separated by I/O) on a
//! single simulated CPU under First-Come-First-Served, Shortest Remaining
//! Time and Round-Robin scheduling, producing an event trace and summary
//! statistics for each policy.
//!
//! # Architecture
//!
//! - **Engine**: millisecond tick loop that drives the policy hooks
//! - **State**: clock, ready queue, blocked and terminated sets, context
//!   switch accounting
//! - **Policies**: FCFS, SRT and RR behind the [`Policy`] trait
//! - **Trace**: recorded events, rendered by [`fmt`]
//!
//! # Usage
//!
//! ```rust,no_run
//! use cpusim::*;
//!
//! let workload = load_workload("processes.txt").unwrap();
//! let config = SimConfig::default().context_switch_ms(4).time_slice_ms(100);
//!
//! for result in run_all(&workload, &config).unwrap() {
//!     result.trace.dump();
//!     println!("{:?}", result.stats);
//! }
//! ```

pub mod config;
pub mod det_hashmap;
pub mod engine;
pub mod fmt;
pub mod generate;
pub mod policy;
pub mod process;
pub mod ready;
pub mod report;
pub mod state;
pub mod stats;
pub mod trace;
pub mod types;
pub mod workload;

pub use config::{ConfigError, RrAdd, SimConfig};
pub use engine::{run_all, sim_clock, sim_policy, SimulationResult, Simulator};
pub use fmt::SimFormat;
pub use policy::{Candidate, Fcfs, Policy, PolicyKind, RoundRobin, Srt};
pub use process::{ProcState, ProcessDef, SimProcess};
pub use report::write_report;
pub use stats::RunStats;
pub use trace::{PreemptCause, Trace, TraceEvent, TraceKind};
pub use types::{Pid, TimeMs};
pub use workload::{load_workload, parse_workload, WorkloadError};
