use serde::{Deserialize, Serialize};

/// Last observed connectivity of a profile.
///
/// This is a cached observation (the result of the most recent status check
/// or completed connect/disconnect), never a live guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// A user-named VPN target.
///
/// Serialized as one entry of `profiles.json`:
/// `{ "name":"office", "server":"vpn.example.com", "username":"alice", ... }`
/// The credential fields are opaque here; only the script generator reads
/// them. `state` is runtime-only and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VpnProfile {
    pub name: String,
    pub server: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub preshared_key: String,
    #[serde(skip)]
    pub state: ConnectionState,
}

impl VpnProfile {
    pub fn new(
        name: impl Into<String>,
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        preshared_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            username: username.into(),
            password: password.into(),
            preshared_key: preshared_key.into(),
            state: ConnectionState::Disconnected,
        }
    }
}
