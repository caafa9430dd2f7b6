mod common;
use crate::common::scripted::{ScriptedCommand, Step};
use crate::common::{calls, init_tracing, test_options};

use std::time::{Duration, Instant};

use jobrunner::command::engine::UNEXPECTED_FAULT_MESSAGE;
use jobrunner::command::{Command, Detail, ParallelCommand, Severity};
use jobrunner::counter::WorkCounter;
use jobrunner::types::ErrorStrategy;

#[test]
fn n_ok_children_count_n_times() {
    init_tracing();
    let counter = WorkCounter::new();
    let children = (0..8)
        .map(|i| {
            ScriptedCommand::always(&format!("w{i}"), Step::Ok, test_options(&counter)).boxed()
        })
        .collect();
    // The parallel command itself gets a separate counter so only children
    // are counted here.
    let own = WorkCounter::new();
    let mut parallel = ParallelCommand::new(children, test_options(&own));

    let result = parallel.process().expect("all children OK");

    assert!(result.is_ok());
    assert_eq!(counter.get_count(), 8);
    assert_eq!(own.get_count(), 1);
}

#[test]
fn children_run_concurrently() {
    let counter = WorkCounter::new();
    let children = (0..4)
        .map(|i| {
            ScriptedCommand::always(
                &format!("sleeper{i}"),
                Step::SleepOk(Duration::from_millis(300)),
                test_options(&counter),
            )
            .boxed()
        })
        .collect();
    let mut parallel = ParallelCommand::new(children, test_options(&counter));

    let started = Instant::now();
    parallel.process().unwrap();
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(1100),
        "4 x 300ms should overlap, took {elapsed:?}"
    );
    assert_eq!(counter.get_count(), 5);
}

#[test]
fn first_fault_in_child_order_is_reraised_after_all_join() {
    let counter = WorkCounter::new();
    let slow_ok = ScriptedCommand::always(
        "slow",
        Step::SleepOk(Duration::from_millis(100)),
        test_options(&counter),
    );
    let slow_calls = slow_ok.calls();
    let children = vec![
        slow_ok.boxed(),
        ScriptedCommand::always("first", Step::Fatal(1), test_options(&counter)).boxed(),
        ScriptedCommand::always("second", Step::Fatal(2), test_options(&counter)).boxed(),
    ];
    let mut parallel = ParallelCommand::new(
        children,
        test_options(&counter).with_error_strategy(ErrorStrategy::Restart),
    );

    let fatal = parallel.process().expect_err("fault must surface");

    assert_eq!(fatal.result().message(), Some("first fatal"));
    assert_eq!(fatal.retry(), 1);
    // The sibling was not cancelled and completed its work.
    assert_eq!(calls(&slow_calls), 1);
    assert_eq!(counter.get_count(), 1);
}

#[test]
fn panicking_worker_becomes_error() {
    let counter = WorkCounter::new();
    let children = vec![
        ScriptedCommand::always("fine", Step::Ok, test_options(&counter)).boxed(),
        ScriptedCommand::always("boom", Step::Panic, test_options(&counter)).boxed(),
    ];
    let mut parallel = ParallelCommand::new(children, test_options(&counter));

    let result = parallel.process().expect("panics are not fatal faults");

    // The panicking child reports ERROR; the parallel command returns it.
    assert_eq!(result.level(), Severity::Error);
    assert_eq!(result.message(), Some(UNEXPECTED_FAULT_MESSAGE));
    match result.additional_info() {
        [Detail::Fault(err)] => assert!(err.to_string().contains("boom panicked")),
        other => panic!("expected captured panic, got {other:?}"),
    }
    assert_eq!(counter.get_count(), 1);
}

#[test]
fn first_child_error_is_returned_and_omitted_errors_ignored() {
    let counter = WorkCounter::new();
    let children = vec![
        ScriptedCommand::always(
            "tolerated",
            Step::Error,
            test_options(&counter).with_error_strategy(ErrorStrategy::Omit),
        )
        .boxed(),
        ScriptedCommand::always("bad", Step::Error, test_options(&counter)).boxed(),
        ScriptedCommand::always("worse", Step::Error, test_options(&counter)).boxed(),
    ];
    let mut parallel = ParallelCommand::new(
        children,
        test_options(&counter).with_error_strategy(ErrorStrategy::Omit),
    );

    let result = parallel.process().unwrap();

    assert_eq!(result.level(), Severity::Error);
    assert_eq!(result.message(), Some("bad error"));
}

#[test]
fn work_count_is_sum_of_children() {
    let counter = WorkCounter::new();
    let children = vec![
        ScriptedCommand::always("a", Step::Ok, test_options(&counter))
            .with_work_count(4)
            .boxed(),
        ScriptedCommand::always("b", Step::Ok, test_options(&counter))
            .with_work_count(6)
            .boxed(),
    ];
    let parallel = ParallelCommand::new(children, test_options(&counter));

    assert_eq!(parallel.work_count(), 10);
    assert_eq!(parallel.commands().len(), 2);
    assert_eq!(counter.get_count(), 0);
}
