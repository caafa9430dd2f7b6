mod common;
use crate::common::scripted::{ScriptedCommand, Step};
use crate::common::{calls, test_options};

use jobrunner::command::{BoxedCommand, Command, CyclicCommand, GroupCommand, Severity};
use jobrunner::counter::WorkCounter;
use jobrunner::errors::JobRunnerError;
use jobrunner::types::ErrorStrategy;

#[test]
fn runs_child_exactly_cycles_times() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::always("tick", Step::Ok, test_options(&counter));
    let ticks = child.calls();
    let mut cyclic = CyclicCommand::new(child.boxed(), 4, test_options(&counter)).unwrap();

    let result = cyclic.process().unwrap();

    assert!(result.is_ok());
    assert_eq!(calls(&ticks), 4);
    assert_eq!(counter.get_count(), 5);
}

#[test]
fn work_count_is_child_count_times_cycles() {
    let counter = WorkCounter::new();
    let child =
        ScriptedCommand::always("tick", Step::Ok, test_options(&counter)).with_work_count(3);
    let cyclic = CyclicCommand::new(child.boxed(), 5, test_options(&counter)).unwrap();

    assert_eq!(cyclic.work_count(), 15);
    assert_eq!(cyclic.cycles(), 5);
    assert_eq!(counter.get_count(), 0);
}

#[test]
fn zero_cycles_is_rejected_at_construction() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::always("tick", Step::Ok, test_options(&counter));

    let err = CyclicCommand::new(child.boxed(), 0, test_options(&counter))
        .err()
        .expect("zero cycles must be rejected");

    assert!(matches!(err, JobRunnerError::ConfigError(msg) if msg.contains("cycles")));
}

#[test]
fn fault_aborts_remaining_cycles() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::new(
        "tick",
        vec![Step::Ok, Step::Critical, Step::Ok],
        test_options(&counter),
    );
    let ticks = child.calls();
    // Even `omit` on the cyclic command does not stop a fault from escaping.
    let mut cyclic = CyclicCommand::new(
        child.boxed(),
        10,
        test_options(&counter).with_error_strategy(ErrorStrategy::Omit),
    )
    .unwrap();

    let fatal = cyclic.process().expect_err("fault must propagate");

    assert_eq!(fatal.result().message(), Some("tick critical"));
    assert_eq!(calls(&ticks), 2);
    assert_eq!(counter.get_count(), 1);
}

#[test]
fn child_error_does_not_end_loop_and_is_reported_after_all_cycles() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::new(
        "tick",
        vec![Step::Ok, Step::Error, Step::Unexpected, Step::Ok],
        test_options(&counter),
    );
    let ticks = child.calls();
    let mut cyclic = CyclicCommand::new(child.boxed(), 4, test_options(&counter)).unwrap();

    let result = cyclic.process().unwrap();

    assert_eq!(calls(&ticks), 4, "every cycle runs");
    assert_eq!(result.level(), Severity::Error);
    assert_eq!(result.message(), Some("tick error"), "first reported result wins");
    assert_eq!(counter.get_count(), 2);
}

#[test]
fn always_failing_child_runs_every_cycle() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::always("tick", Step::Error, test_options(&counter));
    let ticks = child.calls();
    let mut cyclic = CyclicCommand::new(
        child.boxed(),
        3,
        test_options(&counter).with_error_strategy(ErrorStrategy::Omit),
    )
    .unwrap();

    let result = cyclic.process().expect("omit must not raise");

    assert_eq!(calls(&ticks), 3);
    assert_eq!(result.level(), Severity::Error);
}

#[test]
fn cyclic_restart_reruns_all_cycles() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::new(
        "tick",
        vec![Step::Error, Step::Ok, Step::Ok, Step::Ok],
        test_options(&counter),
    );
    let ticks = child.calls();
    // The first pass reports the child's ERROR; restart runs both cycles again.
    let mut cyclic = CyclicCommand::new(
        child.boxed(),
        2,
        test_options(&counter).with_error_strategy(ErrorStrategy::Restart),
    )
    .unwrap();

    let result = cyclic.process().unwrap();

    assert!(result.is_ok());
    assert_eq!(calls(&ticks), 4);
}

#[test]
fn nested_work_count_saturates_instead_of_overflowing() {
    let counter = WorkCounter::new();
    let leaf = ScriptedCommand::always("tick", Step::Ok, test_options(&counter)).with_work_count(2);
    let inner = CyclicCommand::new(leaf.boxed(), u32::MAX, test_options(&counter)).unwrap();
    let middle = CyclicCommand::new(Box::new(inner), u32::MAX, test_options(&counter)).unwrap();
    let outer = CyclicCommand::new(Box::new(middle), u32::MAX, test_options(&counter)).unwrap();

    assert_eq!(outer.work_count(), u64::MAX);

    let outer: BoxedCommand = Box::new(outer);
    let group = GroupCommand::new(
        vec![
            outer,
            ScriptedCommand::always("extra", Step::Ok, test_options(&counter)).boxed(),
        ],
        test_options(&counter),
    );
    assert_eq!(group.work_count(), u64::MAX);
}

#[test]
fn omitted_child_errors_do_not_end_loop() {
    let counter = WorkCounter::new();
    let child = ScriptedCommand::always(
        "tick",
        Step::Error,
        test_options(&counter).with_error_strategy(ErrorStrategy::Omit),
    );
    let ticks = child.calls();
    let mut cyclic = CyclicCommand::new(child.boxed(), 3, test_options(&counter)).unwrap();

    let result = cyclic.process().unwrap();

    assert_eq!(result.level(), Severity::Ok);
    assert_eq!(calls(&ticks), 3);
}

#[test]
fn nested_cycle_of_group_multiplies_work() {
    let counter = WorkCounter::new();
    let group = GroupCommand::new(
        vec![
            ScriptedCommand::always("a", Step::Ok, test_options(&counter)).boxed(),
            ScriptedCommand::always("b", Step::Ok, test_options(&counter))
                .with_work_count(2)
                .boxed(),
        ],
        test_options(&counter),
    );
    let mut cyclic = CyclicCommand::new(Box::new(group), 3, test_options(&counter)).unwrap();

    assert_eq!(cyclic.work_count(), 9);

    cyclic.process().unwrap();
    // Per cycle: a, b, group. Plus the cyclic command once.
    assert_eq!(counter.get_count(), 10);
}
