use cpusim::*;

mod common;
use common::*;

fn rr(slice: TimeMs, rr_add: RrAdd) -> RoundRobin {
    RoundRobin::new(slice, rr_add)
}

#[test]
fn test_slice_expiry_requeues() {
    setup_test();
    let workload = [proc("A", 0, 5, 1, 0), proc("B", 0, 2, 1, 0)];
    let result = run(rr(3, RrAdd::End), config(2, 3), &workload);

    assert_eq!(
        lines(&result),
        vec![
            "time 0ms: Simulator started for RR [Q <empty>]",
            "time 0ms: Process A arrived and added to ready queue [Q A]",
            "time 0ms: Process B arrived and added to ready queue [Q A B]",
            "time 1ms: Process A started using the CPU [Q B]",
            "time 4ms: Time slice expired; process A preempted with 2ms to go [Q B]",
            "time 6ms: Process B started using the CPU [Q A]",
            "time 8ms: Process B terminated [Q A]",
            "time 10ms: Process A started using the CPU with 2ms remaining [Q <empty>]",
            "time 12ms: Process A terminated [Q <empty>]",
            "time 13ms: Simulator ended for RR",
        ]
    );

    let stats = &result.stats;
    assert_eq!(stats.total_wait, 9);
    assert_close(stats.avg_wait, 4.5);
    assert_eq!(stats.total_turnaround, 22);
    assert_close(stats.avg_turnaround, 11.0);
    assert_eq!(stats.context_switches, 3);
    assert_eq!(stats.preemptions, 1);
}

#[test]
fn test_rr_add_end_vs_beginning() {
    setup_test();
    let workload = [
        proc("A", 0, 5, 1, 0),
        proc("B", 0, 2, 1, 0),
        proc("C", 0, 2, 1, 0),
    ];

    let end = run(rr(3, RrAdd::End), config(2, 3), &workload);
    assert_eq!(end.trace.dispatch_order(), pids(&["A", "B", "C", "A"]));
    assert_eq!(end.stats.end_time, 17);

    let begin = run(rr(3, RrAdd::Beginning), config(2, 3), &workload);
    assert_eq!(begin.trace.dispatch_order(), pids(&["A", "B", "A", "C"]));
    assert_eq!(begin.stats.end_time, 17);
    assert_eq!(begin.stats.preemptions, 1);
}

#[test]
fn test_rr_add_from_config() {
    setup_test();
    let workload = [
        proc("A", 0, 5, 1, 0),
        proc("B", 0, 2, 1, 0),
        proc("C", 0, 2, 1, 0),
    ];
    let config = config(2, 3).rr_add(RrAdd::Beginning);
    let results = run_all(&workload, &config).unwrap();
    assert_eq!(results[2].stats.policy, "RR");
    assert_eq!(results[2].trace.dispatch_order(), pids(&["A", "B", "A", "C"]));
}

#[test]
fn test_sole_process_resumes_itself() {
    setup_test();
    let workload = [proc("A", 0, 5, 1, 0)];
    let result = run(rr(2, RrAdd::End), config(2, 2), &workload);

    let lines = lines(&result);
    assert_has_line(
        &lines,
        "time 3ms: Time slice expired; process A preempted with 3ms to go [Q <empty>]",
    );
    assert_has_line(
        &lines,
        "time 5ms: Process A started using the CPU with 3ms remaining [Q <empty>]",
    );
    assert_has_line(
        &lines,
        "time 9ms: Process A started using the CPU with 1ms remaining [Q <empty>]",
    );

    let stats = &result.stats;
    assert_eq!(stats.context_switches, 3);
    assert_eq!(stats.preemptions, 2);
    assert_eq!(stats.total_wait, 0);
    assert_eq!(stats.total_turnaround, 11);
    assert_eq!(stats.end_time, 11);
}

#[test]
fn test_burst_ending_with_slice_is_not_preempted() {
    setup_test();
    let workload = [proc("A", 0, 2, 1, 0)];
    let result = run(rr(2, RrAdd::End), config(2, 2), &workload);
    assert_eq!(result.stats.context_switches, 1);
    assert_eq!(result.stats.preemptions, 0);
}

#[test]
fn test_arrivals_never_preempt() {
    setup_test();
    let workload = [proc("A", 0, 10, 1, 0), proc("B", 3, 1, 1, 0)];
    let result = run(rr(80, RrAdd::End), config(4, 80), &workload);
    assert_eq!(result.trace.dispatch_order(), pids(&["A", "B"]));
    assert_eq!(result.stats.preemptions, 0);
}

#[test]
fn test_slice_restarts_after_io() {
    setup_test();
    // Each 2ms burst fits a 3ms slice, so blocking and coming back must
    // start a fresh slice rather than continue the old one.
    let workload = [proc("A", 0, 2, 3, 1)];
    let result = run(rr(3, RrAdd::End), config(2, 3), &workload);
    assert_eq!(result.stats.preemptions, 0);
    assert_eq!(result.stats.context_switches, 3);
}
