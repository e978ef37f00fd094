//! Workload file loader.
//!
//! One process per line:
//!
//! ```text
//! # pid|arrival|burst|num_bursts|io_time
//! A|0|168|5|287
//! B|0|385|1|0
//! ```
//!
//! Blank lines and lines starting with `#` are skipped, and whitespace
//! around lines and fields is trimmed.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::process::ProcessDef;
use crate::types::TimeMs;

/// Errors from loading a workload.
#[derive(Debug)]
pub enum WorkloadError {
    /// The file could not be read.
    Io(std::io::Error),
    /// A line is malformed. `line` is 1-based; 0 refers to the whole file.
    Format { line: usize, reason: String },
}

impl fmt::Display for WorkloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkloadError::Io(e) => write!(f, "I/O error: {e}"),
            WorkloadError::Format { line: 0, reason } => write!(f, "invalid workload: {reason}"),
            WorkloadError::Format { line, reason } => write!(f, "line {line}: {reason}"),
        }
    }
}

impl std::error::Error for WorkloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkloadError::Io(e) => Some(e),
            WorkloadError::Format { .. } => None,
        }
    }
}

impl From<std::io::Error> for WorkloadError {
    fn from(e: std::io::Error) -> Self {
        WorkloadError::Io(e)
    }
}

fn format_err(line: usize, reason: impl Into<String>) -> WorkloadError {
    WorkloadError::Format {
        line,
        reason: reason.into(),
    }
}

fn parse_field<T: std::str::FromStr>(
    line: usize,
    name: &str,
    value: &str,
) -> Result<T, WorkloadError> {
    value.parse().map_err(|_| {
        format_err(
            line,
            format!("{name}: expected a non-negative integer, got {value:?}"),
        )
    })
}

fn parse_line(lineno: usize, line: &str) -> Result<ProcessDef, WorkloadError> {
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(format_err(
            lineno,
            format!("expected 5 '|'-separated fields, found {}", fields.len()),
        ));
    }

    let pid = fields[0];
    if pid.is_empty() {
        return Err(format_err(lineno, "empty process id"));
    }
    let arrival: TimeMs = parse_field(lineno, "arrival", fields[1])?;
    let burst: TimeMs = parse_field(lineno, "burst", fields[2])?;
    let count: u32 = parse_field(lineno, "num_bursts", fields[3])?;
    let io: TimeMs = parse_field(lineno, "io_time", fields[4])?;

    if burst == 0 {
        return Err(format_err(lineno, "burst length must be positive"));
    }
    if count == 0 {
        return Err(format_err(lineno, "burst count must be positive"));
    }
    if count == 1 && io > 0 {
        warn!(pid, io, "single-burst process never performs I/O");
    }

    Ok(ProcessDef::new(pid, arrival, burst, count, io))
}

/// Parse workload text.
///
/// Process order is preserved: it breaks ties between processes that
/// become ready at the same time.
pub fn parse_workload(text: &str) -> Result<Vec<ProcessDef>, WorkloadError> {
    let mut defs = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let def = parse_line(lineno, line)?;
        if !seen.insert(def.pid.clone()) {
            return Err(format_err(lineno, format!("duplicate process id {}", def.pid)));
        }
        defs.push(def);
    }

    if defs.is_empty() {
        return Err(format_err(0, "no processes"));
    }
    debug!(processes = defs.len(), "parsed workload");
    Ok(defs)
}

/// Read and parse a workload file.
pub fn load_workload(path: impl AsRef<Path>) -> Result<Vec<ProcessDef>, WorkloadError> {
    let text = std::fs::read_to_string(path.as_ref())?;
    parse_workload(&text)
}

/// Render a workload in the file format accepted by [`parse_workload`].
pub fn to_workload_text(defs: &[ProcessDef]) -> String {
    let mut out = String::from("# pid|arrival|burst|num_bursts|io_time\n");
    for d in defs {
        out.push_str(&format!(
            "{}|{}|{}|{}|{}\n",
            d.pid, d.arrival_time, d.cpu_burst_length, d.burst_count, d.io_burst_length
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Pid;

    fn format_line(text: &str) -> usize {
        match parse_workload(text) {
            Err(WorkloadError::Format { line, .. }) => line,
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let defs = parse_workload("# header\n\n  A|0|168|5|287  \nB | 3 | 385 | 1 | 0\n").unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0], ProcessDef::new("A", 0, 168, 5, 287));
        assert_eq!(defs[1].pid, Pid::from("B"));
        assert_eq!(defs[1].arrival_time, 3);
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert_eq!(format_line("A|0|4|1\n"), 1);
        assert_eq!(format_line("A|0|4|1|0\nB|x|4|1|0\n"), 2);
        assert_eq!(format_line("A|0|-4|1|0\n"), 1);
        assert_eq!(format_line("A|0|0|1|0\n"), 1);
        assert_eq!(format_line("A|0|4|0|0\n"), 1);
        assert_eq!(format_line("|0|4|1|0\n"), 1);
        assert_eq!(format_line("A|0|4|1|0\n# again\nA|1|2|1|0\n"), 3);
        assert_eq!(format_line("# nothing here\n"), 0);
    }

    #[test]
    fn test_text_reparses() {
        let defs = vec![
            ProcessDef::new("A", 0, 4, 2, 10),
            ProcessDef::new("B", 7, 3, 1, 0),
        ];
        assert_eq!(parse_workload(&to_workload_text(&defs)).unwrap(), defs);
    }

    #[test]
    fn test_error_messages() {
        let err = parse_workload("A|0|4|1\n").unwrap_err();
        assert_eq!(err.to_string(), "line 1: expected 5 '|'-separated fields, found 4");
        let err = parse_workload("").unwrap_err();
        assert_eq!(err.to_string(), "invalid workload: no processes");
    }
}
