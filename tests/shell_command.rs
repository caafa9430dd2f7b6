#![cfg(unix)]

mod common;
use crate::common::{TestResult, init_tracing, test_options};

use jobrunner::command::engine::UNEXPECTED_FAULT_MESSAGE;
use jobrunner::command::{Command, Detail, Severity, ShellCommand};
use jobrunner::counter::WorkCounter;
use jobrunner::errors::JobRunnerError;
use tempfile::tempdir;

fn texts(details: &[Detail]) -> Vec<String> {
    details
        .iter()
        .filter_map(|d| match d {
            Detail::Text(t) => Some(t.clone()),
            Detail::Fault(_) => None,
        })
        .collect()
}

#[test]
fn zero_exit_is_ok_with_stdout_as_message() -> TestResult {
    init_tracing();
    let counter = WorkCounter::new();
    let mut cmd = ShellCommand::from_shell("echo hello", test_options(&counter))?;
    assert_eq!(cmd.argv(), ["sh", "-c", "echo hello"]);

    let result = cmd.process()?;

    assert_eq!(result.level(), Severity::Ok);
    assert_eq!(result.message(), Some("hello\n"));
    assert_eq!(counter.get_count(), 1);
    Ok(())
}

#[test]
fn non_zero_exit_is_error_with_stderr_attached() -> TestResult {
    let counter = WorkCounter::new();
    let mut cmd = ShellCommand::from_shell(
        "echo partial; echo broken >&2; exit 3",
        test_options(&counter),
    )?;

    let result = cmd.process()?;

    assert_eq!(result.level(), Severity::Error);
    assert_eq!(result.message(), Some("partial\n"));
    assert_eq!(texts(result.additional_info()), vec!["broken\n".to_string()]);
    assert_eq!(counter.get_count(), 0);
    Ok(())
}

#[test]
fn argv_runs_without_shell_in_cwd() -> TestResult {
    let dir = tempdir()?;
    std::fs::write(dir.path().join("marker.txt"), "")?;
    let counter = WorkCounter::new();
    let mut cmd = ShellCommand::new(vec!["ls".to_string()], test_options(&counter))?
        .with_cwd(dir.path());

    assert_eq!(cmd.cwd(), Some(dir.path()));
    let result = cmd.process()?;

    assert!(result.is_ok());
    assert!(result.message().unwrap_or_default().contains("marker.txt"));
    Ok(())
}

#[test]
fn missing_program_is_coerced_to_error() -> TestResult {
    let counter = WorkCounter::new();
    let mut cmd = ShellCommand::new(
        vec!["definitely-not-a-real-program-xyz".to_string()],
        test_options(&counter),
    )?;

    let result = cmd.process()?;

    assert_eq!(result.level(), Severity::Error);
    assert_eq!(result.message(), Some(UNEXPECTED_FAULT_MESSAGE));
    assert!(matches!(result.additional_info(), [Detail::Fault(_)]));
    Ok(())
}

#[test]
fn empty_command_lines_are_rejected() {
    let counter = WorkCounter::new();

    let empty_argv = ShellCommand::new(Vec::new(), test_options(&counter));
    assert!(matches!(empty_argv, Err(JobRunnerError::ConfigError(_))));

    let blank_program = ShellCommand::new(vec!["  ".to_string()], test_options(&counter));
    assert!(matches!(blank_program, Err(JobRunnerError::ConfigError(_))));

    let blank_line = ShellCommand::from_shell("   ", test_options(&counter));
    assert!(matches!(blank_line, Err(JobRunnerError::ConfigError(_))));
}
