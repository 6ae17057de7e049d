pub mod mocks;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use mocks::{ProbeRoom, ProbeRoomFactory, PurgeBehaviour};
#[allow(unused_imports)]
pub use setup::{idle_directory, ticking_directory, IDLE_INTERVAL, PURGE_TIMEOUT};
