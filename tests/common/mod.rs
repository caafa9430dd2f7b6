#![allow(dead_code)]

pub use jobrunner_test_utils::builders;
pub use jobrunner_test_utils::scripted;
pub use jobrunner_test_utils::{init_tracing, test_options};

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn Error>>;

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}
