//! Statistics report writer.

use std::io::{self, Write};

use crate::stats::RunStats;

/// Write the per-policy statistics block for each run, in order.
pub fn write_report<W: Write>(w: &mut W, runs: &[RunStats]) -> io::Result<()> {
    for stats in runs {
        writeln!(w, "Algorithm {}", stats.policy)?;
        writeln!(w, "-- average CPU burst time: {:.2} ms", stats.avg_burst)?;
        writeln!(w, "-- average wait time: {:.2} ms", stats.avg_wait)?;
        writeln!(w, "-- average turnaround time: {:.2} ms", stats.avg_turnaround)?;
        writeln!(w, "-- total number of context switches: {}", stats.context_switches)?;
        writeln!(w, "-- total number of preemptions: {}", stats.preemptions)?;
    }
    Ok(())
}
