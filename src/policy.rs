//! Scheduling policies.
//!
//! A [`Policy`] makes the per-tick decisions the driver delegates: how the
//! ready queue is ordered, how a batch of simultaneously-ready processes is
//! ordered, whether a newly-ready process preempts the running one, and
//! (for Round-Robin) when a time slice runs out.

use std::fmt;
use std::str::FromStr;

use crate::config::{RrAdd, SimConfig};
use crate::process::SimProcess;
use crate::ready::{QueueOrder, QueuePos};
use crate::types::{Pid, TimeMs};

/// A process that became ready during the current tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub pid: Pid,
    /// When it became due (arrival time or I/O completion time).
    pub due: TimeMs,
    /// Remaining time of its current burst.
    pub remaining: TimeMs,
}

/// Decision hooks for one scheduling policy.
pub trait Policy: Send + Sync {
    /// Short name used in traces and reports.
    fn name(&self) -> &'static str;

    fn queue_order(&self) -> QueueOrder;

    /// Order a batch of processes that became ready in the same step.
    ///
    /// Batches arrive sorted by pid (I/O completions) or by workload order
    /// (arrivals). The default keeps that order among processes that became
    /// due at the same time.
    fn order_candidates(&self, batch: &mut [Candidate]) {
        batch.sort_by_key(|c| c.due);
    }

    /// Whether `candidate`, just made ready, takes the CPU from `running`.
    fn should_preempt(&self, _running: &SimProcess, _candidate: &SimProcess) -> bool {
        false
    }

    /// Called after a process is put on the CPU.
    fn on_admit(&self, _proc: &mut SimProcess) {}

    /// Called once per millisecond the process spends on the CPU.
    fn on_tick(&self, _proc: &mut SimProcess) {}

    /// Whether the running process has used up its time slice.
    fn slice_expired(&self, _proc: &SimProcess) -> bool {
        false
    }

    /// Where a preempted process re-enters a FIFO ready queue.
    fn requeue_position(&self) -> QueuePos {
        QueuePos::Front
    }
}

/// First-come, first-served. Never preempts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fcfs;

impl Policy for Fcfs {
    fn name(&self) -> &'static str {
        "FCFS"
    }

    fn queue_order(&self) -> QueueOrder {
        QueueOrder::Fifo
    }

    fn on_admit(&self, proc: &mut SimProcess) {
        // Bursts are never interrupted, so every dispatch starts a full one.
        debug_assert!(!proc.is_resuming(), "FCFS resumed {}", proc.pid());
        proc.remaining = proc.def.cpu_burst_length;
    }
}

/// Shortest remaining time first, preemptive.
///
/// Only the best process of each batch that becomes ready in a tick is
/// compared against the running process; the rest of the batch is queued
/// without comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct Srt;

impl Policy for Srt {
    fn name(&self) -> &'static str {
        "SRT"
    }

    fn queue_order(&self) -> QueueOrder {
        QueueOrder::ShortestRemaining
    }

    fn order_candidates(&self, batch: &mut [Candidate]) {
        batch.sort_by(|a, b| (a.remaining, &a.pid).cmp(&(b.remaining, &b.pid)));
    }

    fn should_preempt(&self, running: &SimProcess, candidate: &SimProcess) -> bool {
        candidate.remaining < running.remaining
    }
}

/// Round-Robin with a fixed quantum.
///
/// Newly-ready processes always join the tail of the queue and never
/// preempt. A process that runs for a full slice with burst time left is
/// re-queued at the tail or head depending on [`RrAdd`].
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    time_slice: TimeMs,
    rr_add: RrAdd,
}

impl RoundRobin {
    pub fn new(time_slice: TimeMs, rr_add: RrAdd) -> Self {
        RoundRobin { time_slice, rr_add }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(config.time_slice_ms, config.rr_add)
    }
}

impl Policy for RoundRobin {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn queue_order(&self) -> QueueOrder {
        QueueOrder::Fifo
    }

    fn on_admit(&self, proc: &mut SimProcess) {
        proc.slice_used = 0;
    }

    fn on_tick(&self, proc: &mut SimProcess) {
        proc.slice_used += 1;
    }

    fn slice_expired(&self, proc: &SimProcess) -> bool {
        proc.slice_used >= self.time_slice
    }

    fn requeue_position(&self) -> QueuePos {
        match self.rr_add {
            RrAdd::End => QueuePos::Back,
            RrAdd::Beginning => QueuePos::Front,
        }
    }
}

/// The three built-in policies, for selection by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Fcfs,
    Srt,
    Rr,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Fcfs, PolicyKind::Srt, PolicyKind::Rr];

    /// Build the policy object for this kind.
    pub fn build(self, config: &SimConfig) -> Box<dyn Policy> {
        match self {
            PolicyKind::Fcfs => Box::new(Fcfs),
            PolicyKind::Srt => Box::new(Srt),
            PolicyKind::Rr => Box::new(RoundRobin::from_config(config)),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PolicyKind::Fcfs => "FCFS",
            PolicyKind::Srt => "SRT",
            PolicyKind::Rr => "RR",
        })
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FCFS" => Ok(PolicyKind::Fcfs),
            "SRT" => Ok(PolicyKind::Srt),
            "RR" => Ok(PolicyKind::Rr),
            _ => Err(format!("unknown policy {s:?} (expected FCFS, SRT or RR)")),
        }
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn queue_order(&self) -> QueueOrder {
        (**self).queue_order()
    }

    fn order_candidates(&self, batch: &mut [Candidate]) {
        (**self).order_candidates(batch)
    }

    fn should_preempt(&self, running: &SimProcess, candidate: &SimProcess) -> bool {
        (**self).should_preempt(running, candidate)
    }

    fn on_admit(&self, proc: &mut SimProcess) {
        (**self).on_admit(proc)
    }

    fn on_tick(&self, proc: &mut SimProcess) {
        (**self).on_tick(proc)
    }

    fn slice_expired(&self, proc: &SimProcess) -> bool {
        (**self).slice_expired(proc)
    }

    fn requeue_position(&self) -> QueuePos {
        (**self).requeue_position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ProcessDef;

    fn cand(pid: &str, due: TimeMs, remaining: TimeMs) -> Candidate {
        Candidate {
            pid: Pid::from(pid),
            due,
            remaining,
        }
    }

    fn names(batch: &[Candidate]) -> Vec<&str> {
        batch.iter().map(|c| c.pid.as_str()).collect()
    }

    #[test]
    fn test_fcfs_keeps_batch_order() {
        let mut batch = vec![cand("C", 4, 1), cand("A", 4, 9), cand("B", 2, 5)];
        Fcfs.order_candidates(&mut batch);
        assert_eq!(names(&batch), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_srt_orders_by_remaining_then_pid() {
        let mut batch = vec![cand("C", 0, 3), cand("A", 9, 5), cand("B", 0, 3)];
        Srt.order_candidates(&mut batch);
        assert_eq!(names(&batch), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_srt_preempts_only_when_strictly_shorter() {
        let running = SimProcess::new(&ProcessDef::new("A", 0, 5, 1, 0));
        let equal = SimProcess::new(&ProcessDef::new("B", 0, 5, 1, 0));
        let shorter = SimProcess::new(&ProcessDef::new("C", 0, 4, 1, 0));
        assert!(!Srt.should_preempt(&running, &equal));
        assert!(Srt.should_preempt(&running, &shorter));
        assert!(!Fcfs.should_preempt(&running, &shorter));
    }

    #[test]
    fn test_rr_slice_accounting() {
        let rr = RoundRobin::new(2, RrAdd::Beginning);
        let mut p = SimProcess::new(&ProcessDef::new("A", 0, 5, 1, 0));
        rr.on_admit(&mut p);
        rr.on_tick(&mut p);
        assert!(!rr.slice_expired(&p));
        rr.on_tick(&mut p);
        assert!(rr.slice_expired(&p));
        rr.on_admit(&mut p);
        assert!(!rr.slice_expired(&p));
        assert_eq!(rr.requeue_position(), QueuePos::Front);
        assert_eq!(RoundRobin::new(2, RrAdd::End).requeue_position(), QueuePos::Back);
    }

    #[test]
    fn test_policy_kind_by_name() {
        assert_eq!("rr".parse::<PolicyKind>(), Ok(PolicyKind::Rr));
        assert!("lottery".parse::<PolicyKind>().is_err());
        let config = SimConfig::default();
        let names: Vec<&str> = PolicyKind::ALL
            .iter()
            .map(|k| k.build(&config).name())
            .collect();
        assert_eq!(names, vec!["FCFS", "SRT", "RR"]);
    }
}
