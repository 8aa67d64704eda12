#![allow(dead_code)] // each test binary uses a different slice of the helpers

pub mod fake_runner;

use std::sync::{Arc, Mutex};
use vpnmgr::{
    ConnectionController, Intent, LogSink, ScriptSource, Severity, VpnProfile,
};

use self::fake_runner::FakeRunner;

/// Deterministic script generator: `connect acme`, `disconnect acme`,
/// `status acme`. Tests key [`FakeRunner`] responses by these strings.
pub struct StubScripts;

impl ScriptSource for StubScripts {
    fn command(&self, profile: &VpnProfile, intent: Intent) -> String {
        let verb = match intent {
            Intent::Connect => "connect",
            Intent::Disconnect => "disconnect",
            Intent::Status => "status",
        };
        format!("{verb} {}", profile.name)
    }
}

/// A profile fixture with throwaway credentials.
pub fn profile(name: &str) -> VpnProfile {
    VpnProfile::new(name, "vpn.example.com", "alice", "s3cret", "psk")
}

/// Controller wired to a fake runner and the stub script generator.
pub fn controller_with(runner: Arc<FakeRunner>) -> ConnectionController {
    ConnectionController::new(runner, Arc::new(StubScripts))
}

/// Log sink that records every `(line, severity)` pair for assertions.
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(String, Severity)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(String, Severity)> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for CollectingSink {
    fn log(&self, line: &str, severity: Severity) {
        self.lines.lock().unwrap().push((line.to_string(), severity));
    }
}
