use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;

use super::profile::VpnProfile;

/// Persists the ordered profile list as one `profiles.json`.
///
/// A single file rather than one file per profile: the collection is
/// ordered, and the order must survive restarts.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// `~/.config/vpnmgr/profiles.json` on Linux,
    /// `%APPDATA%\vpnmgr\profiles.json` on Windows, etc.
    pub fn new() -> io::Result<Self> {
        let proj = ProjectDirs::from("", "", "vpnmgr")
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Unable to locate config dir"))?;
        let dir = proj.config_dir();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join("profiles.json"),
        })
    }

    /// Store backed by an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns every stored profile in order; a missing file is an empty list.
    pub fn load(&self) -> io::Result<Vec<VpnProfile>> {
        match fs::File::open(&self.path) {
            Ok(file) => serde_json::from_reader(file).map_err(SerdeError::into),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Create or overwrite the profile list.
    pub fn save(&self, profiles: &[VpnProfile]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&self.path)?;
        serde_json::to_writer_pretty(file, profiles).map_err(SerdeError::into)
    }
}
