//! Command generation for the external interpreter.
//!
//! The orchestration core never builds interpreter commands itself. It asks
//! a [`ScriptSource`] for an opaque command string per profile and intent,
//! so tests can substitute deterministic stubs and other platforms can plug
//! in their own client tooling.

use crate::storage::profile::VpnProfile;

/// What the generated command is supposed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Connect,
    Disconnect,
    Status,
}

/// Produces the interpreter command for a profile and intent.
pub trait ScriptSource: Send + Sync {
    fn command(&self, profile: &VpnProfile, intent: Intent) -> String;
}

/// PowerShell commands driving the Windows built-in L2TP client.
///
/// The status command prints the bare word `Connected` only while the tunnel
/// is up and prints nothing otherwise. Connectivity detection is a plain
/// substring scan for `Connected`, so the status script must never emit text
/// like `Disconnected` that contains the marker.
pub struct PowerShellScripts;

/// Quote a value as a PowerShell single-quoted literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl ScriptSource for PowerShellScripts {
    fn command(&self, profile: &VpnProfile, intent: Intent) -> String {
        let name = ps_quote(&profile.name);
        match intent {
            Intent::Connect => format!(
                "if (-not (Get-VpnConnection -Name {name} -ErrorAction SilentlyContinue)) \
                 {{ Add-VpnConnection -Name {name} -ServerAddress {server} -TunnelType L2tp \
                 -L2tpPsk {psk} -AuthenticationMethod Pap -EncryptionLevel Optional -Force }}; \
                 rasdial {name} {user} {pass}",
                server = ps_quote(&profile.server),
                psk = ps_quote(&profile.preshared_key),
                user = ps_quote(&profile.username),
                pass = ps_quote(&profile.password),
            ),
            Intent::Disconnect => format!("rasdial {name} /DISCONNECT"),
            Intent::Status => format!(
                "if ((Get-VpnConnection -Name {name} -ErrorAction SilentlyContinue).ConnectionStatus \
                 -eq 'Connected') {{ 'Connected' }}"
            ),
        }
    }
}
