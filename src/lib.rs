// Library crate for the conference room directory
// This file exposes the public API for the server binary and integration tests

pub mod config;
pub mod connection;
pub mod room;
pub mod shared;

use axum::Router;
use tower_http::trace::TraceLayer;

// Re-export commonly used types for easier access in tests
pub use config::{AppConfig, ConfigError};
pub use connection::{ConnectionHandle, ConnectionProvider, StaticConnectionProvider};
pub use room::{
    MemoryRoom, MemoryRoomFactory, PurgeError, Room, RoomContext, RoomDirectory, RoomFactory,
    RoomName, RoomOptions, SweepConfig, SweepReport, SweeperState,
};
pub use shared::{AppError, AppState};

/// Builds the HTTP application with request tracing
pub fn app(state: AppState) -> Router {
    room::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
