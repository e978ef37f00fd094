//! Trace event recording for the simulator.
//!
//! Every state transition (arrival, dispatch, burst completion, I/O
//! completion, preemption, termination) is recorded as a [`TraceEvent`]
//! with the simulated time and a snapshot of the ready queue taken right
//! after the transition. Rendering lives in [`crate::fmt`].

use serde::Serialize;

use crate::types::{Pid, TimeMs};

/// A single trace event produced by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEvent {
    /// Simulated time in milliseconds when this event occurred.
    pub time_ms: TimeMs,
    /// The kind of event.
    pub kind: TraceKind,
    /// Ready queue contents in dispatch order.
    pub queue: Vec<Pid>,
}

/// What made a newly-ready process preempt the running one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PreemptCause {
    Arrival,
    IoCompletion,
}

/// The type of scheduling event recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TraceKind {
    SimulatorStarted { policy: String },
    /// A process arrived and joined the ready queue.
    Arrived { pid: Pid },
    /// A process finished its I/O and joined the ready queue.
    IoCompleted { pid: Pid },
    /// A process was dispatched. `resumed` carries the remaining burst time
    /// when an interrupted burst continues.
    Started { pid: Pid, resumed: Option<TimeMs> },
    /// A CPU burst finished and more bursts remain.
    BurstCompleted { pid: Pid, bursts_left: u32 },
    /// The process leaves the CPU and blocks on I/O until `io_until`.
    SwitchingOut { pid: Pid, io_until: TimeMs },
    /// A newly-ready process `pid` takes the CPU away from `victim`.
    Preempted {
        pid: Pid,
        victim: Pid,
        cause: PreemptCause,
    },
    /// The running process used up its time slice with `remaining` to go.
    SliceExpired { pid: Pid, remaining: TimeMs },
    /// The process completed its last CPU burst.
    Terminated { pid: Pid },
    SimulatorEnded { policy: String },
}

/// A complete simulation trace, containing all events in emission order.
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    policy: String,
    events: Vec<TraceEvent>,
}

impl Trace {
    pub(crate) fn new(policy: &str) -> Self {
        Self {
            policy: policy.to_string(),
            events: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, time_ms: TimeMs, kind: TraceKind, queue: Vec<Pid>) {
        self.events.push(TraceEvent {
            time_ms,
            kind,
            queue,
        });
    }

    /// Get all events in emission order.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Time of the final event (the end of the simulation).
    pub fn end_time(&self) -> TimeMs {
        self.events.last().map_or(0, |e| e.time_ms)
    }

    /// Pids in the order they were dispatched.
    pub fn dispatch_order(&self) -> Vec<Pid> {
        self.events
            .iter()
            .filter_map(|e| match &e.kind {
                TraceKind::Started { pid, .. } => Some(pid.clone()),
                _ => None,
            })
            .collect()
    }

    /// Count completed CPU bursts, including the final one of each process.
    pub fn burst_completions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TraceKind::BurstCompleted { .. } | TraceKind::Terminated { .. }
                )
            })
            .count()
    }

    /// Count preemptions of any kind.
    pub fn preemptions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    TraceKind::Preempted { .. } | TraceKind::SliceExpired { .. }
                )
            })
            .count()
    }

    /// Calculate the CPU time (milliseconds) a process received.
    ///
    /// Sums the intervals between `Started` and the next event that takes
    /// the process off the CPU.
    pub fn total_runtime(&self, pid: &Pid) -> TimeMs {
        let mut total: TimeMs = 0;
        let mut running: Option<(&Pid, TimeMs)> = None;

        for event in &self.events {
            match &event.kind {
                TraceKind::Started { pid: p, .. } => {
                    running = Some((p, event.time_ms));
                }
                TraceKind::BurstCompleted { pid: p, .. }
                | TraceKind::Terminated { pid: p }
                | TraceKind::SliceExpired { pid: p, .. }
                | TraceKind::Preempted { victim: p, .. } => {
                    if let Some((r, start)) = running {
                        if r == p {
                            if r == pid {
                                total += event.time_ms - start;
                            }
                            running = None;
                        }
                    }
                }
                _ => {}
            }
        }

        total
    }

    /// Print the rendered trace to stderr.
    pub fn dump(&self) {
        for event in &self.events {
            eprintln!("{event}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_and_counts() {
        let a = Pid::from("A");
        let b = Pid::from("B");
        let mut trace = Trace::new("SRT");
        trace.record(0, TraceKind::SimulatorStarted { policy: "SRT".into() }, vec![]);
        trace.record(2, TraceKind::Started { pid: a.clone(), resumed: None }, vec![]);
        trace.record(
            5,
            TraceKind::Preempted {
                pid: b.clone(),
                victim: a.clone(),
                cause: PreemptCause::Arrival,
            },
            vec![],
        );
        trace.record(7, TraceKind::Started { pid: b.clone(), resumed: None }, vec![a.clone()]);
        trace.record(9, TraceKind::Terminated { pid: b.clone() }, vec![a.clone()]);
        trace.record(11, TraceKind::Started { pid: a.clone(), resumed: Some(4) }, vec![]);
        trace.record(15, TraceKind::Terminated { pid: a.clone() }, vec![]);

        assert_eq!(trace.total_runtime(&a), 7);
        assert_eq!(trace.total_runtime(&b), 2);
        assert_eq!(trace.burst_completions(), 2);
        assert_eq!(trace.preemptions(), 1);
        assert_eq!(trace.dispatch_order(), vec![a.clone(), b, a]);
        assert_eq!(trace.end_time(), 15);
    }
}
