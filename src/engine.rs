//! Tick-driven simulation engine.
//!
//! This is the core of the simulator. Each iteration of the loop is one
//! millisecond tick and runs the same fixed sequence of steps; the order of
//! the steps decides every tie between events that fall on the same tick:
//!
//! 1. charge the running process for the elapsed millisecond and detect the
//!    end of its burst (or, for Round-Robin, of its time slice);
//! 2. ready the processes whose I/O has completed;
//! 3. ready the processes that have arrived;
//! 4. let the policy preempt, once per batch from steps 2 and 3 and once for
//!    an expired slice;
//! 5. switch out a process whose burst ended, ready any I/O that completes
//!    by the end of that switch, and dispatch the queue head if the CPU is
//!    free;
//! 6. stop once every process has terminated;
//! 7. advance the clock by one millisecond.
//!
//! Context switches move the clock forward inside a tick, so an I/O
//! completion or arrival can fall inside a skipped stretch of time. Steps
//! 2 and 3 therefore pick up everything due at or before the clock.

use std::cell::Cell;
use std::thread;

use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::config::{ConfigError, SimConfig};
use crate::policy::{Candidate, Policy, PolicyKind};
use crate::process::ProcessDef;
use crate::ready::QueuePos;
use crate::state::{Incoming, Retire, SchedState};
use crate::stats::RunStats;
use crate::trace::{PreemptCause, Trace, TraceKind};
use crate::types::{Pid, TimeMs};

thread_local! {
    static SIM_CLOCK: Cell<TimeMs> = const { Cell::new(0) };
    static SIM_POLICY: Cell<&'static str> = const { Cell::new("") };
}

/// Simulated time of the run on the current thread.
///
/// Used by [`crate::fmt::SimFormat`] to stamp log lines with simulated
/// rather than wall-clock time.
pub fn sim_clock() -> TimeMs {
    SIM_CLOCK.with(|c| c.get())
}

/// Name of the policy running on the current thread, or `""` outside a run.
pub fn sim_policy() -> &'static str {
    SIM_POLICY.with(|c| c.get())
}

fn set_sim_clock(now: TimeMs) {
    SIM_CLOCK.with(|c| c.set(now));
}

/// Trace and statistics of one policy run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub trace: Trace,
    pub stats: RunStats,
}

/// Runs one policy over workloads.
pub struct Simulator<P: Policy> {
    policy: P,
    config: SimConfig,
}

impl<P: Policy> Simulator<P> {
    pub fn new(policy: P, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Simulator { policy, config })
    }

    /// Run the workload to completion and return the trace and statistics.
    ///
    /// # Panics
    /// Panics on an empty workload, duplicate pids, or an internal
    /// scheduling invariant violation.
    pub fn run(&self, workload: &[ProcessDef]) -> SimulationResult {
        let name = self.policy.name();
        let span = info_span!("run", policy = name);
        let _enter = span.enter();
        SIM_POLICY.with(|c| c.set(name));
        set_sim_clock(0);

        let mut state = SchedState::new(workload, self.policy.queue_order(), self.config.cs_half());
        let mut trace = Trace::new(name);
        let limit = time_bound(workload, self.config.context_switch_ms);

        self.emit(
            &mut trace,
            &state,
            TraceKind::SimulatorStarted {
                policy: name.to_string(),
            },
        );

        loop {
            let (retiring, expired) = self.charge_running(&mut state, &mut trace);

            let io_batch = due_io(&mut state);
            self.ready_batch(
                &mut state,
                &mut trace,
                io_batch,
                PreemptCause::IoCompletion,
                retiring.is_some(),
            );

            let arrivals: Vec<Candidate> = state
                .due_arrivals()
                .into_iter()
                .map(|pid| {
                    let p = state.process(&pid);
                    Candidate {
                        due: p.def.arrival_time,
                        remaining: p.remaining,
                        pid,
                    }
                })
                .collect();
            self.ready_batch(
                &mut state,
                &mut trace,
                arrivals,
                PreemptCause::Arrival,
                retiring.is_some(),
            );

            if let Some(pid) = expired {
                if state.running() == Some(&pid) {
                    self.expire_slice(&mut state, &mut trace, &pid);
                }
            }

            if let Some(retire) = retiring {
                state.retire_running(retire);
                // Zero-length I/O is due at the end of the switch-out.
                let io_batch = due_io(&mut state);
                self.ready_batch(
                    &mut state,
                    &mut trace,
                    io_batch,
                    PreemptCause::IoCompletion,
                    false,
                );
            }
            if state.running().is_none() {
                if let Some(pid) = state.pop_ready() {
                    state.admit(&pid);
                    self.policy.on_admit(state.process_mut(&pid));
                    let started = started(&state, &pid);
                    self.emit(&mut trace, &state, started);
                }
            }

            if cfg!(debug_assertions) {
                state.check_invariants();
            }
            if state.all_terminated() {
                break;
            }

            assert!(
                state.clock() <= limit,
                "{name} simulation stalled at {}ms",
                state.clock()
            );
            state.tick();
        }

        self.emit(
            &mut trace,
            &state,
            TraceKind::SimulatorEnded {
                policy: name.to_string(),
            },
        );

        let stats = state.summary(name);
        info!(
            end_ms = stats.end_time,
            context_switches = stats.context_switches,
            preemptions = stats.preemptions,
            "simulation finished"
        );
        SIM_POLICY.with(|c| c.set(""));
        SimulationResult { trace, stats }
    }

    /// Step 1: charge the running process for the elapsed millisecond.
    ///
    /// Returns how the process leaves the CPU if its burst just ended, and
    /// its pid if its time slice ran out instead. Burst completion wins
    /// when both happen on the same tick.
    fn charge_running(
        &self,
        state: &mut SchedState,
        trace: &mut Trace,
    ) -> (Option<Retire>, Option<Pid>) {
        let Some(pid) = state.running().cloned() else {
            return (None, None);
        };
        let now = state.clock();
        let cs_half = state.cs_half();

        let proc = state.process_mut(&pid);
        self.policy.on_tick(proc);
        if !proc.consume_tick() {
            let expired = self.policy.slice_expired(proc).then_some(pid);
            return (None, expired);
        }

        proc.complete_burst();
        let bursts_left = proc.bursts_remaining();
        let io_until = now
            .saturating_add(cs_half)
            .saturating_add(proc.def.io_burst_length);
        if bursts_left > 0 {
            self.emit(
                trace,
                state,
                TraceKind::BurstCompleted {
                    pid: pid.clone(),
                    bursts_left,
                },
            );
            self.emit(trace, state, TraceKind::SwitchingOut { pid, io_until });
            (Some(Retire::Block), None)
        } else {
            self.emit(trace, state, TraceKind::Terminated { pid });
            (Some(Retire::Terminate), None)
        }
    }

    /// Steps 2–4 for one batch: let the best candidate challenge the
    /// running process, then queue the rest.
    fn ready_batch(
        &self,
        state: &mut SchedState,
        trace: &mut Trace,
        mut batch: Vec<Candidate>,
        cause: PreemptCause,
        retiring: bool,
    ) {
        if batch.is_empty() {
            return;
        }
        self.policy.order_candidates(&mut batch);

        let victim = match state.running_process() {
            Some(running)
                if !retiring
                    && self
                        .policy
                        .should_preempt(running, state.process(&batch[0].pid)) =>
            {
                Some(running.pid().clone())
            }
            _ => None,
        };
        if let Some(victim) = victim {
            let best = batch.remove(0);
            self.emit(
                trace,
                state,
                TraceKind::Preempted {
                    pid: best.pid.clone(),
                    victim,
                    cause,
                },
            );
            let pid = state.preempt(Incoming::Candidate(best.pid), self.policy.requeue_position());
            self.policy.on_admit(state.process_mut(&pid));
            let started = started(state, &pid);
            self.emit(trace, state, started);
        }

        for c in batch {
            state.enqueue_ready(&c.pid, QueuePos::Back);
            let kind = match cause {
                PreemptCause::Arrival => TraceKind::Arrived { pid: c.pid },
                PreemptCause::IoCompletion => TraceKind::IoCompleted { pid: c.pid },
            };
            self.emit(trace, state, kind);
        }
    }

    /// Step 4 for an expired time slice: re-queue the running process and
    /// dispatch the queue head, which is the same process again when
    /// nothing else is ready.
    fn expire_slice(&self, state: &mut SchedState, trace: &mut Trace, pid: &Pid) {
        let remaining = state.process(pid).remaining;
        self.emit(
            trace,
            state,
            TraceKind::SliceExpired {
                pid: pid.clone(),
                remaining,
            },
        );
        let next = state.preempt(Incoming::QueueHead, self.policy.requeue_position());
        self.policy.on_admit(state.process_mut(&next));
        let started = started(state, &next);
        self.emit(trace, state, started);
    }

    fn emit(&self, trace: &mut Trace, state: &SchedState, kind: TraceKind) {
        set_sim_clock(state.clock());
        debug!("{kind}");
        trace.record(state.clock(), kind, state.queue_snapshot());
    }
}

/// Blocked processes whose I/O is due, as candidates in pid order.
fn due_io(state: &mut SchedState) -> Vec<Candidate> {
    state
        .take_due_io()
        .into_iter()
        .map(|(pid, due)| Candidate {
            remaining: state.process(&pid).remaining,
            pid,
            due,
        })
        .collect()
}

fn started(state: &SchedState, pid: &Pid) -> TraceKind {
    let p = state.process(pid);
    TraceKind::Started {
        pid: pid.clone(),
        resumed: p.is_resuming().then_some(p.remaining),
    }
}

/// Generous upper bound on the simulated end time of a workload.
///
/// Every millisecond after the last arrival is spent running, switching,
/// or waiting on I/O, and Round-Robin can add at most one context switch
/// per millisecond of CPU time.
fn time_bound(workload: &[ProcessDef], context_switch: TimeMs) -> TimeMs {
    let last_arrival = workload.iter().map(|d| d.arrival_time).max().unwrap_or(0);
    let overhead = context_switch.saturating_add(2);
    let work = workload.iter().fold(0 as TimeMs, |acc, d| {
        let per_burst = d
            .io_burst_length
            .saturating_add(d.cpu_burst_length.saturating_mul(overhead))
            .saturating_add(overhead);
        acc.saturating_add(per_burst.saturating_mul(d.burst_count as TimeMs))
    });
    last_arrival
        .saturating_add(work)
        .saturating_mul(2)
        .saturating_add(1000)
}

/// Run FCFS, SRT and RR on independent copies of `workload`, one thread
/// each, and return the results in that order.
pub fn run_all(
    workload: &[ProcessDef],
    config: &SimConfig,
) -> Result<Vec<SimulationResult>, ConfigError> {
    config.validate()?;
    let config = *config;

    let results: Vec<SimulationResult> = thread::scope(|s| {
        let handles: Vec<_> = PolicyKind::ALL
            .iter()
            .map(|&kind| {
                let workload = workload.to_vec();
                s.spawn(move || {
                    let sim = Simulator {
                        policy: kind.build(&config),
                        config,
                    };
                    sim.run(&workload)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });
    Ok(results)
}
