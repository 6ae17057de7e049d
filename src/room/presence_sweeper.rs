use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use strum_macros::Display;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::handle::{PurgeError, Room};
use super::models::RoomName;
use super::repository::RoomRegistry;

/// Configuration for the presence sweeper
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Time between sweep ticks. The first tick fires immediately. Zero falls
    /// back to the default.
    pub sweep_interval: Duration,
    /// Upper bound on a single room's purge call
    pub purge_timeout: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(2),
            purge_timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SweeperState {
    Running,
    Stopped,
}

/// A room whose purge failed during a sweep tick
#[derive(Debug, Clone)]
pub struct PurgeFailure {
    pub room: RoomName,
    pub error: PurgeError,
}

/// Outcome of one sweep tick
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Rooms whose purge was invoked, including the ones that failed
    pub swept: usize,
    /// Rooms in the snapshot that were gone by the time their turn came
    pub skipped: usize,
    pub purged_occupants: usize,
    pub failures: Vec<PurgeFailure>,
}

/// Owns the background sweep task
///
/// Dropping the handle signals the task to stop; `stop` additionally waits
/// for a tick that is already running to finish.
pub struct SweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    pub fn state(&self) -> SweeperState {
        match &self.task {
            Some(task) if !task.is_finished() => SweeperState::Running,
            _ => SweeperState::Stopped,
        }
    }

    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(());

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Presence sweeper task ended abnormally");
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Starts the background task that periodically purges stale occupants from every room
///
/// Must be called from within a tokio runtime.
pub fn start_presence_sweeper(registry: Arc<RoomRegistry>, config: SweepConfig) -> SweeperHandle {
    info!(
        sweep_interval_ms = config.sweep_interval.as_millis() as u64,
        purge_timeout_ms = config.purge_timeout.as_millis() as u64,
        "Starting presence sweeper background task"
    );

    let sweep_interval = if config.sweep_interval.is_zero() {
        let fallback = SweepConfig::default().sweep_interval;
        warn!(
            fallback_ms = fallback.as_millis() as u64,
            "Zero sweep interval, using default"
        );
        fallback
    } else {
        config.sweep_interval
    };

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

    let task = tokio::spawn(async move {
        let mut ticker = interval(sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => break,
                _ = ticker.tick() => {}
            }

            let report = sweep_rooms(&registry, config.purge_timeout).await;

            if report.failures.is_empty() {
                debug!(
                    swept = report.swept,
                    skipped = report.skipped,
                    purged_occupants = report.purged_occupants,
                    "Presence sweep completed"
                );
            } else {
                warn!(
                    swept = report.swept,
                    failed = report.failures.len(),
                    purged_occupants = report.purged_occupants,
                    "Presence sweep completed with failures"
                );
            }
        }

        info!("Presence sweeper stopped");
    });

    SweeperHandle {
        shutdown_tx,
        task: Some(task),
    }
}

/// Runs one sweep tick over a snapshot of the registry
///
/// Rooms are purged one after another, each on its own task. A failing,
/// hanging or panicking room is recorded in the report and the sweep moves on
/// to the next one. A purge that blocks its thread only releases the sweep
/// when the runtime has another worker to drive the timeout.
#[instrument(skip(registry))]
pub async fn sweep_rooms(registry: &RoomRegistry, purge_timeout: Duration) -> SweepReport {
    let rooms = registry.snapshot();
    let mut report = SweepReport::default();

    for (name, room) in rooms {
        if !registry.is_registered(&name, &room) {
            debug!(room = %name, "Room removed since snapshot, skipping");
            report.skipped += 1;
            continue;
        }

        report.swept += 1;

        match purge_room(room, purge_timeout).await {
            Ok(purged) => {
                if purged > 0 {
                    debug!(room = %name, purged = purged, "Purged stale occupants");
                }
                report.purged_occupants += purged;
            }
            Err(error) => {
                warn!(room = %name, error = %error, "Failed to purge stale occupants");
                report.failures.push(PurgeFailure { room: name, error });
            }
        }
    }

    report
}

async fn purge_room(room: Arc<dyn Room>, purge_timeout: Duration) -> Result<usize, PurgeError> {
    let mut purge = tokio::spawn(async move { room.purge_stale_occupants().await });

    match timeout(purge_timeout, &mut purge).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) if join_error.is_panic() => {
            let panic = join_error.into_panic();
            Err(PurgeError::Panicked(panic_message(panic.as_ref())))
        }
        Ok(Err(join_error)) => Err(PurgeError::failed(join_error.to_string())),
        Err(_elapsed) => {
            purge.abort();
            Err(PurgeError::TimedOut(purge_timeout))
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
