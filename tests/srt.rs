use cpusim::*;

mod common;
use common::*;

#[test]
fn test_arrival_preempts_longer_burst() {
    setup_test();
    let workload = [proc("A", 0, 10, 1, 0), proc("B", 3, 2, 1, 0)];
    let result = run(Srt, config(4, 80), &workload);

    assert_eq!(
        lines(&result),
        vec![
            "time 0ms: Simulator started for SRT [Q <empty>]",
            "time 0ms: Process A arrived and added to ready queue [Q A]",
            "time 2ms: Process A started using the CPU [Q <empty>]",
            "time 3ms: Process B arrived and will preempt A [Q <empty>]",
            "time 7ms: Process B started using the CPU [Q A]",
            "time 9ms: Process B terminated [Q A]",
            "time 13ms: Process A started using the CPU with 9ms remaining [Q <empty>]",
            "time 22ms: Process A terminated [Q <empty>]",
            "time 24ms: Simulator ended for SRT",
        ]
    );

    let stats = &result.stats;
    assert_eq!(stats.total_wait, 6);
    assert_close(stats.avg_wait, 3.0);
    assert_eq!(stats.total_turnaround, 8 + 24);
    assert_close(stats.avg_turnaround, 16.0);
    assert_close(stats.avg_burst, 6.0);
    assert_eq!(stats.context_switches, 3);
    assert_eq!(stats.preemptions, 1);
}

#[test]
fn test_equal_remaining_does_not_preempt() {
    setup_test();
    let workload = [proc("A", 0, 5, 1, 0), proc("B", 1, 4, 1, 0)];
    let result = run(Srt, config(2, 80), &workload);

    assert_eq!(result.trace.dispatch_order(), pids(&["A", "B"]));
    let stats = &result.stats;
    assert_eq!(stats.preemptions, 0);
    assert_eq!(stats.context_switches, 2);
    assert_eq!(stats.total_wait, 5);
    assert_eq!(stats.total_turnaround, 7 + 11);
    assert_eq!(stats.end_time, 13);
}

#[test]
fn test_only_best_of_batch_challenges() {
    setup_test();
    let workload = [
        proc("A", 0, 10, 1, 0),
        proc("B", 2, 3, 1, 0),
        proc("C", 2, 4, 1, 0),
    ];
    let result = run(Srt, config(2, 80), &workload);
    let lines = lines(&result);

    assert_has_line(&lines, "time 2ms: Process B arrived and will preempt A [Q <empty>]");
    assert_has_line(&lines, "time 4ms: Process B started using the CPU [Q A]");
    assert_has_line(
        &lines,
        "time 4ms: Process C arrived and added to ready queue [Q C A]",
    );

    assert_eq!(result.trace.dispatch_order(), pids(&["A", "B", "C", "A"]));
    let stats = &result.stats;
    assert_eq!(stats.preemptions, 1);
    assert_eq!(stats.context_switches, 4);
    assert_eq!(stats.total_wait, 15);
    assert_eq!(stats.total_turnaround, 41);
    assert_eq!(stats.end_time, 25);
}

#[test]
fn test_io_completion_preempts() {
    setup_test();
    let workload = [proc("A", 0, 10, 1, 0), proc("B", 0, 1, 2, 2)];
    let result = run(Srt, config(2, 80), &workload);
    let lines = lines(&result);

    assert_has_line(
        &lines,
        "time 2ms: Process B switching out of CPU; will block on I/O until time 5ms [Q A]",
    );
    assert_has_line(
        &lines,
        "time 5ms: Process B completed I/O and will preempt A [Q <empty>]",
    );
    assert_has_line(
        &lines,
        "time 10ms: Process A started using the CPU with 9ms remaining [Q <empty>]",
    );
    assert_eq!(result.trace.dispatch_order(), pids(&["B", "A", "B", "A"]));
    assert_eq!(result.stats.preemptions, 1);
    assert_eq!(result.stats.end_time, 20);
}

#[test]
fn test_shortest_simultaneous_arrival_first() {
    setup_test();
    let workload = [proc("A", 0, 5, 1, 0), proc("B", 0, 3, 1, 0)];
    let result = run(Srt, config(2, 80), &workload);
    assert_eq!(result.trace.dispatch_order(), pids(&["B", "A"]));
    assert_eq!(result.stats.preemptions, 0);
}
