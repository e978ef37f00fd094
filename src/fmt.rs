//! Human-readable rendering of trace events.
//!
//! Each event renders as one line:
//!
//! ```text
//! time 13ms: Process A started using the CPU with 9ms remaining [Q C D]
//! ```

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::engine::{sim_clock, sim_policy};
use crate::trace::{PreemptCause, TraceEvent, TraceKind};
use crate::types::{Pid, TimeMs};

/// Ready queue snapshot formatter: `[Q A B]`, or `[Q <empty>]`.
pub struct FmtQueue<'a>(pub &'a [Pid]);

impl fmt::Display for FmtQueue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("[Q <empty>]");
        }
        f.write_str("[Q")?;
        for pid in self.0 {
            write!(f, " {pid}")?;
        }
        f.write_str("]")
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceKind::SimulatorStarted { policy } => write!(f, "Simulator started for {policy}"),
            TraceKind::Arrived { pid } => {
                write!(f, "Process {pid} arrived and added to ready queue")
            }
            TraceKind::IoCompleted { pid } => {
                write!(f, "Process {pid} completed I/O; added to ready queue")
            }
            TraceKind::Started { pid, resumed: None } => {
                write!(f, "Process {pid} started using the CPU")
            }
            TraceKind::Started {
                pid,
                resumed: Some(remaining),
            } => write!(
                f,
                "Process {pid} started using the CPU with {remaining}ms remaining"
            ),
            TraceKind::BurstCompleted { pid, bursts_left } => write!(
                f,
                "Process {pid} completed a CPU burst; {bursts_left} burst{} to go",
                plural(*bursts_left)
            ),
            TraceKind::SwitchingOut { pid, io_until } => write!(
                f,
                "Process {pid} switching out of CPU; will block on I/O until time {io_until}ms"
            ),
            TraceKind::Preempted {
                pid,
                victim,
                cause: PreemptCause::Arrival,
            } => write!(f, "Process {pid} arrived and will preempt {victim}"),
            TraceKind::Preempted {
                pid,
                victim,
                cause: PreemptCause::IoCompletion,
            } => write!(f, "Process {pid} completed I/O and will preempt {victim}"),
            TraceKind::SliceExpired { pid, remaining } => write!(
                f,
                "Time slice expired; process {pid} preempted with {remaining}ms to go"
            ),
            TraceKind::Terminated { pid } => write!(f, "Process {pid} terminated"),
            TraceKind::SimulatorEnded { policy } => write!(f, "Simulator ended for {policy}"),
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "time {}ms: {}", self.time_ms, self.kind)?;
        if !matches!(self.kind, TraceKind::SimulatorEnded { .. }) {
            write!(f, " {}", FmtQueue(&self.queue))?;
        }
        Ok(())
    }
}

/// Log event formatter that stamps lines with the policy and simulated
/// clock of the run on the current thread instead of wall-clock time.
pub struct SimFormat;

impl<S, N> FormatEvent<S, N> for SimFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "{} ", LogHeader::current())?;

        let level = *event.metadata().level();
        let tag = level_tag(level);
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::ERROR => "\x1b[31m",
                Level::WARN => "\x1b[33m",
                _ => "\x1b[2m",
            };
            write!(writer, "{color}{tag}\x1b[0m ")?;
        } else {
            write!(writer, "{tag} ")?;
        }

        let mut line = EventLine::default();
        event.record(&mut line);
        writeln!(writer, "{}{}", line.message, line.fields)
    }
}

/// `[RR       13ms]` inside a run, `[-            ]` outside one.
struct LogHeader {
    policy: &'static str,
    clock: Option<TimeMs>,
}

impl LogHeader {
    fn current() -> Self {
        let policy = sim_policy();
        LogHeader {
            policy,
            clock: (!policy.is_empty()).then(sim_clock),
        }
    }
}

impl fmt::Display for LogHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clock {
            Some(ms) => write!(f, "[{:<4}{:>7}ms]", self.policy, ms),
            None => write!(f, "[{:<13}]", "-"),
        }
    }
}

fn level_tag(level: Level) -> char {
    match level {
        Level::ERROR => 'E',
        Level::WARN => 'W',
        Level::INFO => 'I',
        Level::DEBUG => 'D',
        Level::TRACE => 'T',
    }
}

/// An event's message followed by its ` key=value` fields, in record order.
#[derive(Default)]
struct EventLine {
    message: String,
    fields: String,
}

impl Visit for EventLine {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={value}", field.name());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            let _ = write!(self.fields, " {}={value:?}", field.name());
        }
    }
}
