use std::fmt::{self, Display};

/// A central error enum for connection-orchestration errors.
#[derive(Debug)]
pub enum VpnError {
    /// The external interpreter process could not be spawned.
    Launch(std::io::Error),
    /// No profile with the given name exists in the collection.
    UnknownProfile(String),
    Other(String),
}

/// Convert from std::io::Error.
///
/// The only io::Error that crosses the public contract is a failed spawn,
/// so the conversion maps straight onto `Launch`.
impl From<std::io::Error> for VpnError {
    fn from(err: std::io::Error) -> VpnError {
        VpnError::Launch(err)
    }
}

impl Display for VpnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VpnError::Launch(e) => write!(f, "failed to launch interpreter: {}", e),
            VpnError::UnknownProfile(name) => write!(f, "no profile named '{}'", name),
            VpnError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for VpnError {}
