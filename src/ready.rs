//! The ready queue.
//!
//! A queue is either FIFO or ordered by `(remaining, pid)`; the ordering is
//! fixed for the lifetime of the queue and chosen by the active policy. The
//! ordered form keeps its entries in a `BTreeSet`, so insertion and removal
//! are O(log n) and ties between equal remaining times fall back to pid.
//! Membership is tracked in a side index, so `contains` is O(1) for both.

use std::collections::{BTreeSet, VecDeque};

use crate::det_hashmap::DetHashMap;
use crate::types::{Pid, TimeMs};

/// How a policy orders its ready queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOrder {
    /// Insertion order.
    Fifo,
    /// Shortest remaining burst time first, ties by pid.
    ShortestRemaining,
}

/// Insertion point for FIFO queues. Ignored by ordered queues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueuePos {
    Back,
    Front,
}

#[derive(Debug)]
enum Entries {
    Fifo(VecDeque<Pid>),
    Ordered(BTreeSet<(TimeMs, Pid)>),
}

/// The single ready queue of a simulation run.
#[derive(Debug)]
pub struct ReadyQueue {
    entries: Entries,
    /// Queued pids and the remaining time they were queued with.
    members: DetHashMap<Pid, TimeMs>,
}

impl ReadyQueue {
    pub fn new(order: QueueOrder) -> Self {
        let entries = match order {
            QueueOrder::Fifo => Entries::Fifo(VecDeque::new()),
            QueueOrder::ShortestRemaining => Entries::Ordered(BTreeSet::new()),
        };
        ReadyQueue {
            entries,
            members: DetHashMap::new(),
        }
    }

    /// Insert a process.
    ///
    /// `remaining` must not change while the process is queued; only the
    /// running process consumes burst time.
    ///
    /// # Panics
    /// Panics if the process is already queued.
    pub fn insert(&mut self, pid: Pid, remaining: TimeMs, pos: QueuePos) {
        let previous = self.members.insert(pid.clone(), remaining);
        assert!(previous.is_none(), "process {pid} is already in the ready queue");
        match &mut self.entries {
            Entries::Fifo(q) => match pos {
                QueuePos::Back => q.push_back(pid),
                QueuePos::Front => q.push_front(pid),
            },
            Entries::Ordered(set) => {
                set.insert((remaining, pid));
            }
        }
    }

    /// Remove and return the head of the queue.
    pub fn pop(&mut self) -> Option<Pid> {
        let pid = match &mut self.entries {
            Entries::Fifo(q) => q.pop_front(),
            Entries::Ordered(set) => set.pop_first().map(|(_, pid)| pid),
        }?;
        self.members.remove(&pid);
        Some(pid)
    }

    pub fn contains(&self, pid: &Pid) -> bool {
        self.members.contains_key(pid)
    }

    /// Remaining time `pid` was queued with, if it is queued.
    pub fn queued_remaining(&self, pid: &Pid) -> Option<TimeMs> {
        self.members.get(pid).copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// All queued pids in dispatch order, without consuming.
    pub fn ordered_pids(&self) -> Vec<Pid> {
        match &self.entries {
            Entries::Fifo(q) => q.iter().cloned().collect(),
            Entries::Ordered(set) => set.iter().map(|(_, pid)| pid.clone()).collect(),
        }
    }
}
