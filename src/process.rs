//! Process model for the simulator.
//!
//! A [`ProcessDef`] is the static description read from a workload file.
//! Each simulation run builds its own [`SimProcess`] from it, so runs of
//! different policies never share mutable state.

use serde::{Deserialize, Serialize};

use crate::types::{Pid, TimeMs};

/// The state a simulated process can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcState {
    /// Not yet arrived.
    New,
    /// Waiting in the ready queue.
    Ready,
    /// Holding the CPU.
    Running,
    /// Doing I/O between two CPU bursts.
    Blocked,
    /// All CPU bursts completed.
    Terminated,
}

/// Static description of a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDef {
    pub pid: Pid,
    /// When the process first becomes ready.
    pub arrival_time: TimeMs,
    /// Length of every CPU burst. Always positive.
    pub cpu_burst_length: TimeMs,
    /// Number of CPU bursts before the process terminates. Always positive.
    pub burst_count: u32,
    /// Length of the I/O burst between two CPU bursts.
    pub io_burst_length: TimeMs,
}

impl ProcessDef {
    pub fn new(
        pid: impl Into<String>,
        arrival_time: TimeMs,
        cpu_burst_length: TimeMs,
        burst_count: u32,
        io_burst_length: TimeMs,
    ) -> Self {
        ProcessDef {
            pid: Pid(pid.into()),
            arrival_time,
            cpu_burst_length,
            burst_count,
            io_burst_length,
        }
    }

    /// Total CPU demand over the whole lifetime of the process.
    pub fn total_cpu_time(&self) -> TimeMs {
        self.cpu_burst_length
            .saturating_mul(self.burst_count as TimeMs)
    }
}

/// A simulated process at runtime.
#[derive(Debug, Clone)]
pub struct SimProcess {
    pub def: ProcessDef,
    /// Milliseconds left in the current CPU burst.
    pub remaining: TimeMs,
    /// CPU bursts not yet completed.
    pub bursts_left: u32,
    /// When the process last entered the ready queue.
    pub last_ready_time: TimeMs,
    /// Start of the turnaround window for the current burst.
    pub last_active_time: TimeMs,
    /// Milliseconds run since the last admission (Round-Robin accounting).
    pub slice_used: TimeMs,
    pub state: ProcState,
}

impl SimProcess {
    pub fn new(def: &ProcessDef) -> Self {
        SimProcess {
            def: def.clone(),
            remaining: def.cpu_burst_length,
            bursts_left: def.burst_count,
            last_ready_time: def.arrival_time,
            last_active_time: def.arrival_time,
            slice_used: 0,
            state: ProcState::New,
        }
    }

    pub fn pid(&self) -> &Pid {
        &self.def.pid
    }

    /// Whether the current burst was interrupted earlier and is being resumed.
    pub fn is_resuming(&self) -> bool {
        self.remaining < self.def.cpu_burst_length
    }

    /// CPU bursts not yet completed, including the current one.
    pub fn bursts_remaining(&self) -> u32 {
        self.bursts_left
    }

    /// Whether every burst has completed and the process has left the CPU.
    pub fn is_finished(&self) -> bool {
        self.bursts_left == 0 && self.state == ProcState::Terminated
    }

    /// Charge one millisecond of CPU time. Returns true when the current
    /// burst has just completed.
    pub(crate) fn consume_tick(&mut self) -> bool {
        assert!(
            self.remaining > 0,
            "process {} ran with no remaining burst time",
            self.def.pid
        );
        self.remaining -= 1;
        self.remaining == 0
    }

    /// Record the completion of the current burst and reset the burst
    /// length for the next one.
    pub(crate) fn complete_burst(&mut self) {
        assert!(self.bursts_left > 0, "process {} has no bursts left", self.def.pid);
        self.bursts_left -= 1;
        if self.bursts_left > 0 {
            self.remaining = self.def.cpu_burst_length;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_starts_full() {
        let def = ProcessDef::new("A", 5, 4, 3, 10);
        let p = SimProcess::new(&def);
        assert_eq!(p.state, ProcState::New);
        assert_eq!(p.remaining, 4);
        assert_eq!(p.bursts_remaining(), 3);
        assert!(!p.is_resuming());
        assert_eq!(def.total_cpu_time(), 12);
    }

    #[test]
    fn test_burst_cycle() {
        let def = ProcessDef::new("A", 0, 2, 2, 0);
        let mut p = SimProcess::new(&def);
        assert!(!p.consume_tick());
        assert!(p.is_resuming());
        assert!(p.consume_tick());
        p.complete_burst();
        assert_eq!(p.bursts_remaining(), 1);
        assert_eq!(p.remaining, 2);
        assert!(!p.is_finished());
        assert!(!p.consume_tick());
        assert!(p.consume_tick());
        p.complete_burst();
        assert_eq!(p.bursts_remaining(), 0);
        assert_eq!(p.remaining, 0);
        // Out of bursts but still on the CPU until switched out.
        assert!(!p.is_finished());
        p.state = ProcState::Terminated;
        assert!(p.is_finished());
    }

    #[test]
    fn test_total_cpu_time_saturates() {
        let def = ProcessDef::new("A", 0, 4_000_000_000_000_000_000, u32::MAX, 0);
        assert_eq!(def.total_cpu_time(), TimeMs::MAX);
    }

    #[test]
    #[should_panic(expected = "no remaining burst time")]
    fn test_tick_past_end_panics() {
        let def = ProcessDef::new("A", 0, 1, 1, 0);
        let mut p = SimProcess::new(&def);
        p.consume_tick();
        p.consume_tick();
    }
}
