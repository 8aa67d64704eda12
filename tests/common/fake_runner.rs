//! A deterministic **in-process stand-in** for `vpnmgr::Runner`.
//!
//! *  **From the test's perspective**
//!    * Script a command's behavior with `fake.respond("status acme", ...)`.
//!    * Inspect every command the controller issued via `fake.history()`.
//!
//! *  **Why this exists**: It lets integration tests exercise the *real*
//!    orchestration machinery (verify passes, compensation, serialized
//!    polling) without spawning a single external process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use vpnmgr::{Runner, VpnError};

/// Scripted behavior for one command string.
#[derive(Clone, Default)]
pub struct FakeResponse {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// Simulate a spawn failure instead of producing output.
    pub fail_launch: bool,
    /// Simulated process runtime, applied before any output is delivered.
    pub delay: Duration,
}

impl FakeResponse {
    pub fn stdout_lines(lines: &[&str]) -> Self {
        Self {
            stdout: lines.iter().map(|l| l.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn launch_failure() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn with_stderr(mut self, lines: &[&str]) -> Self {
        self.stderr = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Fake runner: replays scripted responses and records every invocation.
/// Commands with no scripted response produce no output at all (so an
/// unscripted status probe reads as disconnected).
#[derive(Default)]
pub struct FakeRunner {
    responses: Mutex<HashMap<String, FakeResponse>>,
    history: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, command: &str, response: FakeResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(command.to_string(), response);
    }

    /// Every command run so far, in issue order.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }

    /// Highest number of concurrently in-flight `run` calls observed.
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Runner for FakeRunner {
    async fn run(
        &self,
        command: &str,
        on_output: &mut (dyn for<'a> FnMut(&'a str) + Send),
        on_error: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), VpnError> {
        self.history.lock().unwrap().push(command.to_string());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .unwrap_or_default();

        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        let result = if response.fail_launch {
            Err(VpnError::Launch(io::Error::new(
                io::ErrorKind::NotFound,
                "interpreter not found",
            )))
        } else {
            for line in &response.stdout {
                on_output(line);
            }
            for line in &response.stderr {
                on_error(line);
            }
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
