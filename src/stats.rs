//! Aggregate statistics for one policy run.
//!
//! Averages are taken over the total number of CPU bursts in the workload,
//! not over processes: a process with three bursts contributes three waits
//! and three turnarounds.

use serde::Serialize;

use crate::types::TimeMs;

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub policy: String,
    pub avg_burst: f64,
    pub avg_wait: f64,
    pub avg_turnaround: f64,
    pub context_switches: u64,
    pub preemptions: u64,
    pub total_bursts: u64,
    pub total_wait: TimeMs,
    pub total_turnaround: TimeMs,
    /// Simulated time at which the run ended.
    pub end_time: TimeMs,
}

impl RunStats {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        policy: &str,
        total_bursts: u64,
        total_cpu: TimeMs,
        total_wait: TimeMs,
        total_turnaround: TimeMs,
        context_switches: u64,
        preemptions: u64,
        end_time: TimeMs,
    ) -> Self {
        let per_burst = |total: TimeMs| {
            if total_bursts == 0 {
                0.0
            } else {
                total as f64 / total_bursts as f64
            }
        };
        RunStats {
            policy: policy.to_string(),
            avg_burst: per_burst(total_cpu),
            avg_wait: per_burst(total_wait),
            avg_turnaround: per_burst(total_turnaround),
            context_switches,
            preemptions,
            total_bursts,
            total_wait,
            total_turnaround,
            end_time,
        }
    }

    /// `(avg_burst, avg_wait, avg_turnaround, context_switches, preemptions)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, u64, u64) {
        (
            self.avg_burst,
            self.avg_wait,
            self.avg_turnaround,
            self.context_switches,
            self.preemptions,
        )
    }
}
