#![allow(dead_code)]

use cpusim::*;

/// Initialize tracing from `RUST_LOG`.
///
/// `try_init()` is idempotent: the first call in the process succeeds,
/// later calls are silently ignored.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .event_format(SimFormat)
        .try_init();
}

/// Shorthand for a workload line.
pub fn proc(pid: &str, arrival: TimeMs, burst: TimeMs, count: u32, io: TimeMs) -> ProcessDef {
    ProcessDef::new(pid, arrival, burst, count, io)
}

pub fn config(t_cs: TimeMs, t_slice: TimeMs) -> SimConfig {
    SimConfig::default()
        .context_switch_ms(t_cs)
        .time_slice_ms(t_slice)
}

pub fn run<P: Policy>(policy: P, config: SimConfig, workload: &[ProcessDef]) -> SimulationResult {
    let result = Simulator::new(policy, config).unwrap().run(workload);
    assert_consistent(&result, workload);
    result
}

/// Rendered trace lines.
pub fn lines(result: &SimulationResult) -> Vec<String> {
    result.trace.events().iter().map(|e| e.to_string()).collect()
}

/// Assert that the rendered trace contains `expected` verbatim.
pub fn assert_has_line(lines: &[String], expected: &str) {
    assert!(
        lines.iter().any(|l| l == expected),
        "missing trace line {expected:?}"
    );
}

pub fn pids(names: &[&str]) -> Vec<Pid> {
    names.iter().map(|&n| Pid::from(n)).collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 0.005,
        "expected {expected:.2}, got {actual:.4}"
    );
}

/// Checks every run must pass regardless of policy or workload.
pub fn assert_consistent(result: &SimulationResult, workload: &[ProcessDef]) {
    let trace = &result.trace;
    let stats = &result.stats;
    let total_bursts: u64 = workload.iter().map(|d| d.burst_count as u64).sum();

    assert_eq!(trace.burst_completions() as u64, total_bursts);
    assert_eq!(stats.total_bursts, total_bursts);
    assert_eq!(trace.end_time(), stats.end_time);
    assert_eq!(trace.dispatch_order().len() as u64, stats.context_switches);
    assert_eq!(trace.preemptions() as u64, stats.preemptions);

    for def in workload {
        assert_eq!(
            trace.total_runtime(&def.pid),
            def.total_cpu_time(),
            "{} got the wrong amount of CPU",
            def.pid
        );
    }

    let times: Vec<TimeMs> = trace.events().iter().map(|e| e.time_ms).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]), "time went backwards");
}
