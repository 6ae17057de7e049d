#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use muc_directory::{
    ConnectionHandle, RoomDirectory, RoomFactory, StaticConnectionProvider, SweepConfig,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Interval long enough that only the immediate first tick ever fires
pub const IDLE_INTERVAL: Duration = Duration::from_secs(3600);
pub const PURGE_TIMEOUT: Duration = Duration::from_millis(100);

pub fn directory_with(
    factory: Arc<dyn RoomFactory>,
    sweep_interval: Duration,
) -> Arc<RoomDirectory> {
    let provider = Arc::new(StaticConnectionProvider::new(ConnectionHandle::new(
        "conference.example.com",
    )));

    RoomDirectory::start(
        provider,
        factory,
        SweepConfig {
            sweep_interval,
            purge_timeout: PURGE_TIMEOUT,
        },
    )
}

/// Directory whose background sweeper stays out of the way of the test
///
/// Waits for the immediate first tick to pass over the still-empty registry,
/// so later purge counts only reflect what the test itself triggers.
pub async fn idle_directory(factory: Arc<dyn RoomFactory>) -> Arc<RoomDirectory> {
    let directory = directory_with(factory, IDLE_INTERVAL);
    tokio::time::sleep(Duration::from_millis(20)).await;
    directory
}

pub fn ticking_directory(
    factory: Arc<dyn RoomFactory>,
    sweep_interval: Duration,
) -> Arc<RoomDirectory> {
    directory_with(factory, sweep_interval)
}
