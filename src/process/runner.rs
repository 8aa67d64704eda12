use crate::errors::VpnError;
use async_trait::async_trait;
use log::{debug, warn};
use std::panic::{self, AssertUnwindSafe};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Runs one external command to completion, streaming its output.
///
/// Implementations spawn exactly one process per `run` call and deliver each
/// complete output line to the matching sink, in arrival order per stream.
/// No ordering is guaranteed *between* the two streams. The call suspends
/// its caller until the process exits; sibling tasks keep running.
///
/// There is no timeout: a hung process stalls the invocation indefinitely.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Execute `command` and pump its output into the sinks.
    ///
    /// The only surfaced failure is `VpnError::Launch` when the process
    /// cannot be spawned. Read errors after a successful spawn merely end
    /// that stream's pumping, and the exit status is not part of the
    /// contract: callers decide success from the output text alone.
    async fn run(
        &self,
        command: &str,
        on_output: &mut (dyn for<'a> FnMut(&'a str) + Send),
        on_error: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), VpnError>;
}

/// Executes commands through the platform's shell-style interpreter.
///
/// The command string is passed as a single argument, so it needs no
/// interpreter-specific escaping here.
pub struct ShellRunner {
    program: String,
    args: Vec<String>,
}

impl ShellRunner {
    /// Interpreter for the current platform: `powershell.exe -NoProfile
    /// -ExecutionPolicy Bypass -Command` on Windows, `sh -c` elsewhere.
    pub fn new() -> Self {
        if cfg!(windows) {
            Self {
                program: "powershell.exe".into(),
                args: vec![
                    "-NoProfile".into(),
                    "-ExecutionPolicy".into(),
                    "Bypass".into(),
                    "-Command".into(),
                ],
            }
        } else {
            Self {
                program: "sh".into(),
                args: vec!["-c".into()],
            }
        }
    }

    /// Use a specific interpreter. `args` are passed before the command.
    pub fn with_interpreter(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Deliver one line to a sink. A panicking sink must never take down the
/// pump, so the call is isolated and the line dropped on panic.
fn emit(sink: &mut (dyn for<'a> FnMut(&'a str) + Send), line: &str) {
    if panic::catch_unwind(AssertUnwindSafe(|| sink(line))).is_err() {
        warn!("output sink panicked; line dropped");
    }
}

#[async_trait]
impl Runner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        on_output: &mut (dyn for<'a> FnMut(&'a str) + Send),
        on_error: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> Result<(), VpnError> {
        debug!("spawning {} for command: {}", self.program, command);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(VpnError::Launch)?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(VpnError::Other("child pipes not captured".into()));
        };

        let mut out_lines = BufReader::new(stdout).lines();
        let mut err_lines = BufReader::new(stderr).lines();
        let mut out_open = true;
        let mut err_open = true;

        // Drain both pipes until EOF. `next_line` is cancel-safe, so the
        // select loop preserves per-stream arrival order.
        while out_open || err_open {
            tokio::select! {
                line = out_lines.next_line(), if out_open => match line {
                    Ok(Some(line)) => emit(on_output, &line),
                    Ok(None) => out_open = false,
                    Err(e) => {
                        debug!("stdout read error: {}", e);
                        out_open = false;
                    }
                },
                line = err_lines.next_line(), if err_open => match line {
                    Ok(Some(line)) => emit(on_error, &line),
                    Ok(None) => err_open = false,
                    Err(e) => {
                        debug!("stderr read error: {}", e);
                        err_open = false;
                    }
                },
            }
        }

        // The exit status carries no signal for us: scripts may exit nonzero
        // on benign warnings, so success is judged from output text only.
        match child.wait().await {
            Ok(status) => debug!("process exited with {}", status),
            Err(e) => debug!("wait for child failed: {}", e),
        }

        Ok(())
    }
}
