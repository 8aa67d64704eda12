pub mod core;
pub mod errors;
pub mod process;
pub mod scripts;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::core::controller::{ConnectionController, LogSink, OperationResult, Severity};
pub use crate::core::poller::StatusPoller;
pub use crate::core::profiles::{ProfileCollection, ProfileEvent};
pub use crate::errors::VpnError;
pub use crate::process::runner::{Runner, ShellRunner};
pub use crate::scripts::{Intent, PowerShellScripts, ScriptSource};
pub use crate::storage::profile::{ConnectionState, VpnProfile};
