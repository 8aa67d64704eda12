use crate::core::profiles::ProfileCollection;
use crate::errors::VpnError;
use crate::process::runner::Runner;
use crate::scripts::{Intent, ScriptSource};
use crate::storage::profile::{ConnectionState, VpnProfile};
use log::{debug, info};
use std::sync::Arc;

/// Every stdout line of the status script is scanned for this marker.
/// A plain substring test, case-sensitive, no anchoring; the status script
/// is responsible for emitting the marker only when the tunnel is up.
const CONNECTED_MARKER: &str = "Connected";

/// Tag attached to each forwarded output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Receives the line-by-line output of a connect/disconnect operation.
///
/// Sinks are best-effort: implementations must not fail, and channel-backed
/// sinks drop lines once their receiver is gone.
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str, severity: Severity);
}

impl<F> LogSink for F
where
    F: Fn(&str, Severity) + Send + Sync,
{
    fn log(&self, line: &str, severity: Severity) {
        self(line, severity)
    }
}

/// Outcome of one connect/disconnect operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    pub state: ConnectionState,
}

/// Sequences external commands to realize a connect/disconnect intent.
///
/// Each operation runs the relevant script, verifies the result with a
/// status probe, and writes the observed state back into the collection.
/// The controller holds no per-profile lock: callers must not run two
/// operations against the same profile concurrently, and a status poll
/// racing a user operation is a benign last-writer-wins on the cached state.
///
/// Operations are never retried and cannot be cancelled once started.
pub struct ConnectionController {
    runner: Arc<dyn Runner>,
    scripts: Arc<dyn ScriptSource>,
}

impl ConnectionController {
    pub fn new(runner: Arc<dyn Runner>, scripts: Arc<dyn ScriptSource>) -> Self {
        Self { runner, scripts }
    }

    /// Bring the profile up, then verify.
    ///
    /// If the verification probe still reports the profile disconnected, a
    /// compensating disconnect is issued (best-effort, output discarded) so
    /// no half-established connection is left behind, and the operation
    /// reports failure. A spawn failure surfaces as `VpnError::Launch` and
    /// leaves the cached state untouched.
    pub async fn connect(
        &self,
        profiles: &ProfileCollection,
        name: &str,
        sink: &dyn LogSink,
    ) -> Result<OperationResult, VpnError> {
        let profile = self.lookup(profiles, name)?;
        info!("connecting '{}'", name);

        let script = self.scripts.command(&profile, Intent::Connect);
        self.run_logged(&script, sink).await?;

        let state = self.status_only(profiles, name).await?;
        if state == ConnectionState::Connected {
            info!("'{}' connected", name);
            Ok(OperationResult {
                success: true,
                state,
            })
        } else {
            info!("'{}' failed to connect, rolling back", name);
            let script = self.scripts.command(&profile, Intent::Disconnect);
            if let Err(e) = self.run_silent(&script).await {
                debug!("compensating disconnect for '{}' failed: {}", name, e);
            }
            Ok(OperationResult {
                success: false,
                state,
            })
        }
    }

    /// Tear the profile down, then verify.
    ///
    /// The observed state is always written back; success means the profile
    /// was actually seen disconnected afterwards.
    pub async fn disconnect(
        &self,
        profiles: &ProfileCollection,
        name: &str,
        sink: &dyn LogSink,
    ) -> Result<OperationResult, VpnError> {
        let profile = self.lookup(profiles, name)?;
        info!("disconnecting '{}'", name);

        let script = self.scripts.command(&profile, Intent::Disconnect);
        self.run_logged(&script, sink).await?;

        let state = self.status_only(profiles, name).await?;
        Ok(OperationResult {
            success: state == ConnectionState::Disconnected,
            state,
        })
    }

    /// Probe the profile's current state and cache the observation.
    ///
    /// The profile counts as connected iff any stdout line of the status
    /// script contains [`CONNECTED_MARKER`]. Stderr lines never affect the
    /// verdict. Nothing is forwarded to a log sink: plain status polls are
    /// silent.
    pub async fn status_only(
        &self,
        profiles: &ProfileCollection,
        name: &str,
    ) -> Result<ConnectionState, VpnError> {
        let profile = self.lookup(profiles, name)?;
        let script = self.scripts.command(&profile, Intent::Status);

        let mut connected = false;
        let mut on_output = |line: &str| {
            if line.contains(CONNECTED_MARKER) {
                connected = true;
            }
        };
        let mut on_error = |_line: &str| {};
        self.runner.run(&script, &mut on_output, &mut on_error).await?;

        let state = if connected {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        profiles.set_state(name, state);
        Ok(state)
    }

    fn lookup(&self, profiles: &ProfileCollection, name: &str) -> Result<VpnProfile, VpnError> {
        profiles
            .get(name)
            .ok_or_else(|| VpnError::UnknownProfile(name.to_string()))
    }

    /// Run a script with its output forwarded to the sink, severity-tagged.
    async fn run_logged(&self, script: &str, sink: &dyn LogSink) -> Result<(), VpnError> {
        let mut on_output = |line: &str| sink.log(line, Severity::Info);
        let mut on_error = |line: &str| sink.log(line, Severity::Error);
        self.runner.run(script, &mut on_output, &mut on_error).await
    }

    /// Run a script with its output discarded.
    async fn run_silent(&self, script: &str) -> Result<(), VpnError> {
        let mut on_output = |_line: &str| {};
        let mut on_error = |_line: &str| {};
        self.runner.run(script, &mut on_output, &mut on_error).await
    }
}
