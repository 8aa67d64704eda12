//! Exercises `ShellRunner` against a real `sh`. Unix-only; the Windows
//! interpreter path differs only in the spawned program.
#![cfg(unix)]

use log::LevelFilter;
use vpnmgr::{Runner, ShellRunner, VpnError};

fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

fn sh_available() -> bool {
    if which::which("sh").is_err() {
        eprintln!("sh not found on PATH; skipping");
        return false;
    }
    true
}

#[tokio::test]
async fn lines_arrive_in_order_on_their_own_streams() {
    init_test_logging();
    if !sh_available() {
        return;
    }

    let runner = ShellRunner::new();
    let mut out = Vec::new();
    let mut err = Vec::new();

    let mut on_output = |line: &str| out.push(line.to_string());
    let mut on_error = |line: &str| err.push(line.to_string());
    runner
        .run(
            "echo one; echo two; echo three; echo oops >&2",
            &mut on_output,
            &mut on_error,
        )
        .await
        .expect("sh should spawn");

    assert_eq!(out, ["one", "two", "three"], "stdout order must be preserved");
    assert_eq!(err, ["oops"], "stderr must reach its own sink");
}

#[tokio::test]
async fn run_returns_only_after_the_process_exits() {
    init_test_logging();
    if !sh_available() {
        return;
    }

    let runner = ShellRunner::new();
    let mut seen = Vec::new();
    let mut on_output = |line: &str| seen.push(line.to_string());
    let mut on_error = |_line: &str| {};
    runner
        .run("sleep 0.2; echo done", &mut on_output, &mut on_error)
        .await
        .expect("sh should spawn");

    // If run() resolved before exit we would not have the final line yet.
    assert_eq!(seen, ["done"]);
}

#[tokio::test]
async fn nonzero_exit_is_not_an_error() {
    init_test_logging();
    if !sh_available() {
        return;
    }

    // Scripts may exit nonzero on benign warnings; only the output text
    // carries meaning.
    let runner = ShellRunner::new();
    let mut on_output = |_line: &str| {};
    let mut on_error = |_line: &str| {};
    runner
        .run("echo fine; exit 3", &mut on_output, &mut on_error)
        .await
        .expect("a nonzero exit code must not surface as an error");
}

#[tokio::test]
async fn missing_interpreter_is_a_launch_error() {
    init_test_logging();

    let runner = ShellRunner::with_interpreter("/nonexistent/interpreter", vec![]);
    let mut on_output = |_line: &str| {};
    let mut on_error = |_line: &str| {};
    let result = runner.run("true", &mut on_output, &mut on_error).await;

    assert!(matches!(result, Err(VpnError::Launch(_))));
}

#[tokio::test]
async fn a_panicking_sink_does_not_stop_the_pump() {
    init_test_logging();
    if !sh_available() {
        return;
    }

    let runner = ShellRunner::new();
    let mut survivors = Vec::new();
    let mut on_output = |line: &str| {
        if line == "boom" {
            panic!("sink failure");
        }
        survivors.push(line.to_string());
    };
    let mut on_error = |_line: &str| {};

    runner
        .run("echo boom; echo after", &mut on_output, &mut on_error)
        .await
        .expect("the pump must survive a sink panic");

    assert_eq!(
        survivors,
        ["after"],
        "lines after the faulty one must still be delivered"
    );
}
