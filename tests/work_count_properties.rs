mod common;
use crate::common::scripted::{ScriptedCommand, Step};
use crate::common::test_options;

use proptest::prelude::*;

use jobrunner::command::{
    BoxedCommand, Command, CommandOptions, CyclicCommand, GroupCommand, ParallelCommand,
};
use jobrunner::counter::WorkCounter;
use jobrunner::types::ErrorStrategy;

fn leaves(counts: &[u64], options: &CommandOptions) -> Vec<BoxedCommand> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &n)| {
            ScriptedCommand::always(&format!("leaf{i}"), Step::Ok, options.clone())
                .with_work_count(n)
                .boxed()
        })
        .collect()
}

fn strategy_of(index: u8) -> ErrorStrategy {
    match index % 3 {
        0 => ErrorStrategy::Stop,
        1 => ErrorStrategy::Omit,
        _ => ErrorStrategy::Restart,
    }
}

proptest! {
    #[test]
    fn group_and_parallel_declare_sum_of_children(
        counts in proptest::collection::vec(0u64..50, 0..12),
    ) {
        let counter = WorkCounter::new();
        let options = test_options(&counter);
        let expected: u64 = counts.iter().sum();

        let group = GroupCommand::new(leaves(&counts, &options), options.clone());
        let parallel = ParallelCommand::new(leaves(&counts, &options), options.clone());

        prop_assert_eq!(group.work_count(), expected);
        prop_assert_eq!(parallel.work_count(), expected);
        prop_assert_eq!(counter.get_count(), 0);
    }

    #[test]
    fn cyclic_declares_product(child_works in 0u64..100, cycles in 1u32..50) {
        let counter = WorkCounter::new();
        let child = ScriptedCommand::always("child", Step::Ok, test_options(&counter))
            .with_work_count(child_works)
            .boxed();

        let cyclic = CyclicCommand::new(child, cycles, test_options(&counter))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(cyclic.work_count(), child_works * u64::from(cycles));
        prop_assert_eq!(counter.get_count(), 0);
    }

    #[test]
    fn all_ok_group_counts_every_child_once(
        n in 0usize..10,
        strategy in any::<u8>(),
    ) {
        let counter = WorkCounter::new();
        let options = test_options(&counter).with_error_strategy(strategy_of(strategy));
        let mut group = GroupCommand::new(leaves(&vec![1; n], &options), options.clone());

        let result = group.process();

        prop_assert!(result.is_ok());
        prop_assert_eq!(counter.get_count(), n as u64 + 1);
    }

    #[test]
    fn always_failing_child_never_raises_from_omit_group(n in 1usize..6) {
        let counter = WorkCounter::new();
        let omit = test_options(&counter).with_error_strategy(ErrorStrategy::Omit);
        let mut children = leaves(&vec![1; n], &test_options(&counter));
        children.push(ScriptedCommand::always("bad", Step::Error, test_options(&counter)).boxed());
        let mut group = GroupCommand::new(children, omit);

        let result = group.process();

        prop_assert!(result.is_ok(), "omit group must not raise");
        let result = result.map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(!result.is_ok());
        prop_assert_eq!(counter.get_count(), n as u64);
    }
}
