use crate::core::controller::ConnectionController;
use crate::core::profiles::ProfileCollection;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Periodically refreshes the observed state of every profile.
///
/// One cycle walks the collection in order and awaits each status probe
/// before starting the next, so probes never overlap, neither within a
/// cycle nor across cycles. A cycle that outlasts the interval simply
/// delays the next tick.
///
/// The poller owns its tokio task; it runs until [`StatusPoller::stop`] is
/// called (or the handle is dropped at session teardown).
pub struct StatusPoller {
    task: tokio::task::JoinHandle<()>,
    stop_tx: mpsc::Sender<()>,
}

impl StatusPoller {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

    /// Spawn the polling task. The first cycle starts immediately; later
    /// cycles follow `interval`.
    pub fn start(
        controller: Arc<ConnectionController>,
        profiles: ProfileCollection,
        interval: Duration,
    ) -> Self {
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            info!("status poller started, interval {:?}", interval);
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                // One full cycle, profiles checked strictly one at a time.
                for name in profiles.names() {
                    match controller.status_only(&profiles, &name).await {
                        Ok(state) => debug!("poll: '{}' is {:?}", name, state),
                        Err(e) => warn!("poll: status check for '{}' failed: {}", name, e),
                    }
                }

                tokio::select! {
                    _ = stop_rx.recv() => break,
                    _ = ticker.tick() => {}
                }
            }
            info!("status poller stopped");
        });

        Self { task, stop_tx }
    }

    /// Halt the clock and wait for the task to finish. An in-flight cycle
    /// completes before the task exits.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(()).await;
        let _ = self.task.await;
    }
}
