//! cpusim - Run FCFS, SRT and Round-Robin over a workload file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cpusim::config::{DEFAULT_CONTEXT_SWITCH_MS, DEFAULT_TIME_SLICE_MS};
use cpusim::generate::generate;
use cpusim::workload::to_workload_text;
use cpusim::{
    load_workload, run_all, write_report, RrAdd, RunStats, SimConfig, SimFormat, TimeMs,
    WorkloadError,
};

/// Exit status for an unreadable workload file (`EX_IOERR`).
const EXIT_IO: u8 = 74;
/// Exit status for a malformed workload file (`EX_DATAERR`).
const EXIT_DATA: u8 = 65;

/// Simulate FCFS, SRT and Round-Robin CPU scheduling over a workload.
#[derive(Parser)]
#[command(name = "cpusim")]
struct Cli {
    /// Workload file, one `pid|arrival|burst|num_bursts|io_time` per line.
    ///
    /// With --generate, the generated workload is written here instead
    /// (stdout if omitted).
    input: Option<PathBuf>,

    /// Statistics output file (stdout if omitted).
    stats: Option<PathBuf>,

    /// Where Round-Robin re-queues a preempted process: END or BEGINNING.
    rr_add: Option<RrAdd>,

    /// Context-switch cost in milliseconds. Must be even.
    #[arg(long, env = "CPUSIM_T_CS", default_value_t = DEFAULT_CONTEXT_SWITCH_MS)]
    t_cs: TimeMs,

    /// Round-Robin time slice in milliseconds.
    #[arg(long, env = "CPUSIM_T_SLICE", default_value_t = DEFAULT_TIME_SLICE_MS)]
    t_slice: TimeMs,

    /// Do not print the event trace.
    #[arg(short, long)]
    quiet: bool,

    /// Write traces and statistics of all runs as JSON.
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Generate a random workload of N processes and exit.
    #[arg(long, value_name = "N")]
    generate: Option<usize>,

    /// Seed for --generate.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<WorkloadError>() {
        Some(WorkloadError::Io(_)) => EXIT_IO,
        Some(WorkloadError::Format { .. }) => EXIT_DATA,
        None => 1,
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(count) = cli.generate {
        return write_generated(cli, count);
    }

    let path = cli
        .input
        .as_ref()
        .context("missing required argument: <INPUT>")?;
    let workload =
        load_workload(path).with_context(|| format!("failed to load {}", path.display()))?;

    let config = SimConfig::default()
        .context_switch_ms(cli.t_cs)
        .time_slice_ms(cli.t_slice)
        .rr_add(cli.rr_add.unwrap_or_default());
    let results = run_all(&workload, &config).context("invalid configuration")?;

    if !cli.quiet {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for result in &results {
            for event in result.trace.events() {
                writeln!(out, "{event}")?;
            }
            writeln!(out)?;
        }
    }

    let stats: Vec<RunStats> = results.iter().map(|r| r.stats.clone()).collect();
    match &cli.stats {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut w = BufWriter::new(file);
            write_report(&mut w, &stats)?;
            w.flush()?;
        }
        None => write_report(&mut io::stdout().lock(), &stats)?,
    }

    if let Some(path) = &cli.json {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, &results)
            .with_context(|| format!("failed to write {}", path.display()))?;
        w.flush()?;
        eprintln!("wrote JSON results to {}", path.display());
    }

    Ok(())
}

fn write_generated(cli: &Cli, count: usize) -> Result<()> {
    anyhow::ensure!(count > 0, "--generate needs at least one process");
    let text = to_workload_text(&generate(count, cli.seed));
    match &cli.input {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .event_format(SimFormat)
        .try_init();
}
