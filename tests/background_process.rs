#![cfg(unix)]

mod common;
use crate::common::{TestResult, init_tracing};

use std::time::{Duration, Instant};

use jobrunner::exec::{CancellationToken, run_until_cancelled, shell_argv};
use tokio::time::timeout;

#[tokio::test]
async fn cancel_kills_running_process() -> TestResult {
    init_tracing();
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let status = timeout(
        Duration::from_secs(3),
        run_until_cancelled(&shell_argv("sleep 5"), None, &token),
    )
    .await??;

    assert!(status.is_none(), "cancelled process has no exit status");
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}

#[tokio::test]
async fn process_exiting_first_reports_status() -> TestResult {
    let token = CancellationToken::new();

    let status = run_until_cancelled(&shell_argv("exit 0"), None, &token).await?;

    assert!(status.is_some_and(|s| s.success()));
    assert!(!token.is_cancelled());
    Ok(())
}

#[tokio::test]
async fn already_cancelled_token_stops_at_once() -> TestResult {
    let token = CancellationToken::new();
    token.cancel();

    let status = timeout(
        Duration::from_secs(3),
        run_until_cancelled(&shell_argv("sleep 5"), None, &token),
    )
    .await??;

    assert!(status.is_none());
    Ok(())
}

#[tokio::test]
async fn cancelled_resolves_for_every_clone() -> TestResult {
    let token = CancellationToken::new();
    let waiter = token.clone();
    let waiting = tokio::spawn(async move { waiter.cancelled().await });

    token.cancel();

    timeout(Duration::from_secs(1), waiting).await??;
    assert!(token.is_cancelled());
    // Awaiting after the fact returns immediately.
    timeout(Duration::from_millis(100), token.cancelled()).await?;
    Ok(())
}

#[tokio::test]
async fn spawn_failure_is_an_error() {
    let token = CancellationToken::new();
    let argv = vec!["definitely-not-a-real-program-xyz".to_string()];

    let result = run_until_cancelled(&argv, None, &token).await;

    assert!(result.is_err());
}
