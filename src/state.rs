//! Scheduler state shared by the driver and the policies.
//!
//! Owns the clock, the running slot, the ready queue, the blocked map and
//! the terminated set, plus the run totals. Every context-switch clock
//! advance happens in this module: half the cost on switch-in
//! ([`SchedState::admit`]), half on switch-out
//! ([`SchedState::retire_running`]), both halves on
//! [`SchedState::preempt`].
//!
//! Invariant violations (admitting into an occupied CPU, a process in two
//! containers) panic: the simulation is a total function of its input, so
//! such a state can only come from a bug.

use std::collections::BTreeSet;

use crate::det_hashmap::DetHashMap;
use crate::process::{ProcState, ProcessDef, SimProcess};
use crate::ready::{QueueOrder, QueuePos, ReadyQueue};
use crate::stats::RunStats;
use crate::types::{Pid, TimeMs};

/// Where a process goes when it leaves the CPU at the end of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retire {
    /// More bursts remain: block on I/O.
    Block,
    /// That was the last burst.
    Terminate,
}

/// The process that takes the CPU in a preemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// A process that just became ready and bypasses the ready queue.
    Candidate(Pid),
    /// The head of the ready queue. If the queue is empty, the preempted
    /// process itself is dispatched again.
    QueueHead,
}

/// Mutable context of one simulation run.
#[derive(Debug)]
pub struct SchedState {
    cs_half: TimeMs,
    clock: TimeMs,
    procs: DetHashMap<Pid, SimProcess>,
    /// Pids in workload order.
    order: Vec<Pid>,
    running: Option<Pid>,
    ready: ReadyQueue,
    /// I/O completion time per blocked process.
    blocked: DetHashMap<Pid, TimeMs>,
    terminated: BTreeSet<Pid>,

    total_wait: TimeMs,
    total_turnaround: TimeMs,
    context_switches: u64,
    preemptions: u64,
}

impl SchedState {
    /// Build a fresh state from a workload.
    ///
    /// # Panics
    /// Panics on an empty workload or duplicate pids; the loader rejects
    /// both before a run starts.
    pub fn new(workload: &[ProcessDef], order: QueueOrder, cs_half: TimeMs) -> Self {
        assert!(!workload.is_empty(), "workload must have at least one process");

        let mut procs = DetHashMap::new();
        let mut pids = Vec::with_capacity(workload.len());
        for def in workload {
            let prev = procs.insert(def.pid.clone(), SimProcess::new(def));
            assert!(prev.is_none(), "duplicate pid {}", def.pid);
            pids.push(def.pid.clone());
        }

        SchedState {
            cs_half,
            clock: 0,
            procs,
            order: pids,
            running: None,
            ready: ReadyQueue::new(order),
            blocked: DetHashMap::new(),
            terminated: BTreeSet::new(),
            total_wait: 0,
            total_turnaround: 0,
            context_switches: 0,
            preemptions: 0,
        }
    }

    pub fn clock(&self) -> TimeMs {
        self.clock
    }

    pub(crate) fn tick(&mut self) {
        self.clock += 1;
    }

    pub fn cs_half(&self) -> TimeMs {
        self.cs_half
    }

    pub fn process(&self, pid: &Pid) -> &SimProcess {
        match self.procs.get(pid) {
            Some(p) => p,
            None => panic!("unknown pid {pid}"),
        }
    }

    pub(crate) fn process_mut(&mut self, pid: &Pid) -> &mut SimProcess {
        match self.procs.get_mut(pid) {
            Some(p) => p,
            None => panic!("unknown pid {pid}"),
        }
    }

    pub fn running(&self) -> Option<&Pid> {
        self.running.as_ref()
    }

    pub fn running_process(&self) -> Option<&SimProcess> {
        self.running.as_ref().map(|pid| self.process(pid))
    }

    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready
    }

    /// Snapshot of the ready queue in dispatch order.
    pub fn queue_snapshot(&self) -> Vec<Pid> {
        self.ready.ordered_pids()
    }

    pub fn context_switches(&self) -> u64 {
        self.context_switches
    }

    pub fn preemptions(&self) -> u64 {
        self.preemptions
    }

    pub fn all_terminated(&self) -> bool {
        self.terminated.len() == self.order.len()
    }

    /// NEW/BLOCKED → READY at the current clock.
    ///
    /// Opens a new turnaround window for the burst that is about to be
    /// scheduled.
    pub fn enqueue_ready(&mut self, pid: &Pid, pos: QueuePos) {
        let now = self.clock;
        let proc = self.process_mut(pid);
        assert!(
            matches!(proc.state, ProcState::New | ProcState::Blocked),
            "process {pid} cannot become ready from {:?}",
            proc.state
        );
        proc.state = ProcState::Ready;
        proc.last_ready_time = now;
        proc.last_active_time = now;
        let remaining = proc.remaining;
        self.ready.insert(pid.clone(), remaining, pos);
    }

    /// Remove the head of the ready queue.
    pub fn pop_ready(&mut self) -> Option<Pid> {
        self.ready.pop()
    }

    /// READY → RUNNING. Charges the switch-in half of a context switch.
    ///
    /// # Panics
    /// Panics if another process is running or `pid` is not ready.
    pub fn admit(&mut self, pid: &Pid) {
        assert!(
            self.running.is_none(),
            "cannot admit {pid}: {} is running",
            self.running.as_ref().map_or("?", |p| p.as_str())
        );
        assert!(!self.ready.contains(pid), "process {pid} is still queued");

        let now = self.clock;
        let proc = self.process_mut(pid);
        assert_eq!(proc.state, ProcState::Ready, "admitting {pid} which is not ready");
        let waited = now - proc.last_ready_time;
        proc.state = ProcState::Running;

        self.total_wait += waited;
        self.clock += self.cs_half;
        self.running = Some(pid.clone());
        self.context_switches += 1;
    }

    /// RUNNING → BLOCKED or TERMINATED. Charges the switch-out half of a
    /// context switch and closes the burst's turnaround window.
    ///
    /// Returns the pid that left the CPU.
    pub fn retire_running(&mut self, retire: Retire) -> Pid {
        let pid = match self.running.take() {
            Some(pid) => pid,
            None => panic!("retire_running with an idle CPU"),
        };
        self.clock += self.cs_half;
        let now = self.clock;

        let proc = self.process_mut(&pid);
        let turnaround = now - proc.last_active_time;
        let io_until = now.saturating_add(proc.def.io_burst_length);
        match retire {
            Retire::Block => {
                assert!(proc.bursts_remaining() > 0, "blocking {pid} with no bursts left");
                proc.state = ProcState::Blocked;
            }
            Retire::Terminate => {
                proc.state = ProcState::Terminated;
                assert!(proc.is_finished(), "terminating {pid} with bursts left");
            }
        }

        self.total_turnaround += turnaround;
        match retire {
            Retire::Block => {
                self.blocked.insert(pid.clone(), io_until);
            }
            Retire::Terminate => {
                self.terminated.insert(pid.clone());
            }
        }
        pid
    }

    /// Swap the running process for `incoming`.
    ///
    /// The running process goes back into the ready queue at `requeue`
    /// after the switch-out half. A candidate never sat in the queue, so
    /// it is charged no wait time; a queue head is charged the time it
    /// spent queued. Counts one context switch and one preemption.
    /// Returns the pid now running.
    pub fn preempt(&mut self, incoming: Incoming, requeue: QueuePos) -> Pid {
        let outgoing = match self.running.take() {
            Some(pid) => pid,
            None => panic!("preempt with an idle CPU"),
        };
        let now = self.clock;
        let mid = now + self.cs_half;

        let next = match incoming {
            Incoming::Candidate(pid) => {
                assert!(!self.blocked.contains_key(&pid), "candidate {pid} is still blocked");
                let proc = self.process_mut(&pid);
                assert!(
                    matches!(proc.state, ProcState::New | ProcState::Blocked),
                    "preempting candidate {pid} is {:?}",
                    proc.state
                );
                proc.state = ProcState::Ready;
                proc.last_active_time = now;
                proc.last_ready_time = mid;
                Some(pid)
            }
            Incoming::QueueHead => self.ready.pop(),
        };

        self.clock = mid;
        let proc = self.process_mut(&outgoing);
        proc.state = ProcState::Ready;
        proc.last_ready_time = mid;
        let remaining = proc.remaining;
        self.ready.insert(outgoing.clone(), remaining, requeue);

        let next = match next {
            Some(pid) => pid,
            None => match self.ready.pop() {
                Some(pid) => pid,
                None => panic!("ready queue empty right after re-queueing {outgoing}"),
            },
        };

        let proc = self.process_mut(&next);
        let waited = mid - proc.last_ready_time;
        proc.state = ProcState::Running;

        self.total_wait += waited;
        self.clock += self.cs_half;
        self.running = Some(next.clone());
        self.context_switches += 1;
        self.preemptions += 1;
        next
    }

    /// Remove every blocked process whose I/O completes at or before the
    /// current clock, with its completion time, in pid order. The
    /// processes stay BLOCKED until the caller readies them.
    pub fn take_due_io(&mut self) -> Vec<(Pid, TimeMs)> {
        let now = self.clock;
        self.blocked.extract_sorted(|_, &until| until <= now)
    }

    /// NEW processes whose arrival time has been reached, in workload order.
    pub fn due_arrivals(&self) -> Vec<Pid> {
        self.order
            .iter()
            .filter(|pid| {
                let p = self.process(pid);
                p.state == ProcState::New && p.def.arrival_time <= self.clock
            })
            .cloned()
            .collect()
    }

    /// Check that every process is in exactly the container its state says.
    ///
    /// # Panics
    /// Panics on the first inconsistency found.
    pub fn check_invariants(&self) {
        for pid in &self.order {
            let p = self.process(pid);
            let in_running = self.running.as_ref() == Some(pid);
            let in_ready = self.ready.contains(pid);
            let in_blocked = self.blocked.contains_key(pid);
            let in_terminated = self.terminated.contains(pid);
            let places = [in_running, in_ready, in_blocked, in_terminated]
                .iter()
                .filter(|&&b| b)
                .count();
            let expected = match p.state {
                ProcState::New => places == 0,
                ProcState::Ready => in_ready && places == 1,
                ProcState::Running => in_running && places == 1,
                ProcState::Blocked => in_blocked && places == 1,
                ProcState::Terminated => in_terminated && places == 1,
            };
            assert!(
                expected,
                "process {pid} in state {:?} is in {places} containers",
                p.state
            );
            if let Some(queued) = self.ready.queued_remaining(pid) {
                assert_eq!(
                    queued, p.remaining,
                    "process {pid} changed remaining time while queued"
                );
            }
            assert!(
                p.remaining <= p.def.cpu_burst_length,
                "process {pid} has {}ms remaining of a {}ms burst",
                p.remaining,
                p.def.cpu_burst_length
            );
        }
    }

    /// Summarize the run.
    pub fn summary(&self, policy: &str) -> RunStats {
        let defs: Vec<&ProcessDef> = self.order.iter().map(|pid| &self.process(pid).def).collect();
        let total_bursts: u64 = defs.iter().map(|d| d.burst_count as u64).sum();
        let total_cpu = defs
            .iter()
            .fold(0 as TimeMs, |acc, d| acc.saturating_add(d.total_cpu_time()));
        RunStats::new(
            policy,
            total_bursts,
            total_cpu,
            self.total_wait,
            self.total_turnaround,
            self.context_switches,
            self.preemptions,
            self.clock,
        )
    }
}
