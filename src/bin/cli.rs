use clap::{Parser, Subcommand};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use log::info;
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{self, AsyncReadExt};
use tokio::sync::broadcast::error::RecvError;
use vpnmgr::storage::store::ProfileStore;
use vpnmgr::utils::logging::init_logging;
use vpnmgr::{
    ConnectionController, ConnectionState, PowerShellScripts, ProfileCollection, ProfileEvent,
    Severity, ShellRunner, StatusPoller, VpnError, VpnProfile,
};

/// Enable raw mode via crossterm, throwing an error if it fails.
/// This disables line-buffering and echo on all supported platforms.
fn set_raw_mode() -> Result<(), VpnError> {
    enable_raw_mode().map_err(|e| VpnError::Other(format!("Failed to enable raw mode: {}", e)))
}

/// Restore normal terminal mode.
/// crossterm internally remembers the previous mode and restores it.
fn restore_mode() {
    let _ = disable_raw_mode();
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "vpnmgr",
    version,
    about = "Manage and supervise VPN connection profiles",
    subcommand_required = true
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List profiles in stored order
    List,
    /// Add a new profile
    Add {
        /// Profile name
        name: String,
        /// VPN server address
        #[arg(long)]
        server: String,
        /// Username for authentication
        #[arg(long)]
        username: String,
        /// Password for authentication
        #[arg(long, default_value = "")]
        password: String,
        /// L2TP pre-shared key
        #[arg(long, default_value = "")]
        preshared_key: String,
    },
    /// Edit an existing profile (only the given fields change)
    Edit {
        name: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        preshared_key: Option<String>,
    },
    /// Remove a profile
    Remove { name: String },
    /// Move the profile at index FROM so it ends up at index TO
    Move { from: usize, to: usize },
    /// Connect a profile, streaming the script output
    Connect { name: String },
    /// Disconnect a profile, streaming the script output
    Disconnect { name: String },
    /// Refresh and print the status of one or all profiles
    Status { name: Option<String> },
    /// Poll all profiles periodically and print state changes
    Watch {
        /// Polling interval in seconds
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("vpnmgr error: {e}");
        std::process::exit(1);
    }
}

fn controller() -> Arc<ConnectionController> {
    Arc::new(ConnectionController::new(
        Arc::new(ShellRunner::new()),
        Arc::new(PowerShellScripts),
    ))
}

/// Print forwarded script output: info lines to stdout, error lines to stderr.
fn console_sink(line: &str, severity: Severity) {
    match severity {
        Severity::Info => println!("{line}"),
        Severity::Error => eprintln!("{line}"),
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let store = ProfileStore::new()?;
    let profiles = ProfileCollection::from_profiles(store.load()?);

    match args.command {
        Command::List => {
            for (index, profile) in profiles.snapshot().iter().enumerate() {
                println!("{:2}  {}  ({})", index, profile.name, profile.server);
            }
        }
        Command::Add {
            name,
            server,
            username,
            password,
            preshared_key,
        } => {
            let profile = VpnProfile::new(name.clone(), server, username, password, preshared_key);
            if !profiles.add(profile) {
                return Err(Box::new(VpnError::Other(format!(
                    "a profile named '{name}' already exists"
                ))));
            }
            store.save(&profiles.snapshot())?;
            println!("added '{name}'");
        }
        Command::Edit {
            name,
            server,
            username,
            password,
            preshared_key,
        } => {
            let mut profile = profiles
                .get(&name)
                .ok_or_else(|| VpnError::UnknownProfile(name.clone()))?;
            // Editing a live connection would desynchronize the dial-up
            // entry, so refuse while the profile is observed connected.
            if controller().status_only(&profiles, &name).await? == ConnectionState::Connected {
                return Err(Box::new(VpnError::Other(format!(
                    "'{name}' is connected; disconnect before editing"
                ))));
            }
            if let Some(server) = server {
                profile.server = server;
            }
            if let Some(username) = username {
                profile.username = username;
            }
            if let Some(password) = password {
                profile.password = password;
            }
            if let Some(preshared_key) = preshared_key {
                profile.preshared_key = preshared_key;
            }
            profiles.update(&name, profile);
            store.save(&profiles.snapshot())?;
            println!("updated '{name}'");
        }
        Command::Remove { name } => {
            if profiles.get(&name).is_none() {
                return Err(Box::new(VpnError::UnknownProfile(name)));
            }
            if controller().status_only(&profiles, &name).await? == ConnectionState::Connected {
                return Err(Box::new(VpnError::Other(format!(
                    "'{name}' is connected; disconnect before removing"
                ))));
            }
            profiles.remove(&name);
            store.save(&profiles.snapshot())?;
            println!("removed '{name}'");
        }
        Command::Move { from, to } => {
            if !profiles.move_profile(from, to) {
                return Err(Box::new(VpnError::Other(format!(
                    "cannot move {from} -> {to}"
                ))));
            }
            store.save(&profiles.snapshot())?;
        }
        Command::Connect { name } => {
            let result = controller().connect(&profiles, &name, &console_sink).await?;
            if result.success {
                println!("'{name}' connected");
            } else {
                return Err(Box::new(VpnError::Other(format!(
                    "'{name}' did not come up; connection rolled back"
                ))));
            }
        }
        Command::Disconnect { name } => {
            let result = controller()
                .disconnect(&profiles, &name, &console_sink)
                .await?;
            if result.success {
                println!("'{name}' disconnected");
            } else {
                return Err(Box::new(VpnError::Other(format!(
                    "'{name}' is still connected"
                ))));
            }
        }
        Command::Status { name } => {
            let ctl = controller();
            let names = match name {
                Some(name) => vec![name],
                None => profiles.names(),
            };
            for name in names {
                let state = ctl.status_only(&profiles, &name).await?;
                println!("{name}: {state:?}");
            }
        }
        Command::Watch { interval } => {
            run_watch(profiles, Duration::from_secs(interval)).await?;
        }
    }
    Ok(())
}

/// Runs the watch loop: a StatusPoller refreshes every profile in the
/// background while state changes are printed as they happen. Exits when the
/// user types 'q' or Ctrl+C.
async fn run_watch(
    profiles: ProfileCollection,
    interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let poller = StatusPoller::start(controller(), profiles.clone(), interval);

    // State changes -> echo to the user's terminal
    let mut events = profiles.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(ProfileEvent::StateChanged { name, state }) => {
                    print!("{name} is now {state:?}\r\n");
                    let _ = stdout().flush();
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!("Enable raw mode. Press 'q' or Ctrl+C to stop watching.");
    set_raw_mode()?;

    let mut buf = [0u8; 1];
    let mut stdin = io::stdin();
    loop {
        if stdin.read_exact(&mut buf).await.is_err() {
            break;
        }
        let ch = buf[0];
        if ch == b'q' || ch == 0x03 {
            break;
        }
    }

    restore_mode();
    poller.stop().await;
    printer.abort();
    info!("Terminal mode restored.");
    Ok(())
}
