// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

fn sh(script: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(script);
    cmd
}

#[tokio::test]
#[serial]
async fn captures_output_of_successful_command() {
    let output = run_with_timeout(sh("echo hello"), Duration::from_secs(5), "echo").await.unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[tokio::test]
#[serial]
async fn non_zero_exit_is_returned_not_raised() {
    let output =
        run_with_timeout(sh("echo oops >&2; exit 3"), Duration::from_secs(5), "failing").await.unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(String::from_utf8_lossy(&output.stderr).trim(), "oops");
}

#[tokio::test]
#[serial]
async fn slow_command_times_out() {
    let err = run_with_timeout(sh("sleep 5"), Duration::from_millis(100), "sleeper").await.unwrap_err();
    assert!(matches!(err, SubprocessError::Timeout { .. }));
    assert_eq!(err.to_string(), "sleeper timed out after 0s");
}

#[tokio::test]
#[serial]
async fn missing_program_is_a_spawn_error() {
    let cmd = Command::new("/nonexistent/mq-test-binary");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "missing tool").await.unwrap_err();
    assert!(matches!(err, SubprocessError::Spawn { .. }));
    assert!(err.to_string().starts_with("failed to run missing tool"));
}
