// Public API - what other modules can use
pub use handle::{PurgeError, Room, RoomContext, RoomFactory};
pub use memory::{MemoryRoom, MemoryRoomFactory, Occupant};
pub use models::{RoomInvitation, RoomName, RoomOptions};
pub use presence_sweeper::{PurgeFailure, SweepConfig, SweepReport, SweeperState};
pub use repository::DirectoryLink;
pub use service::RoomDirectory;

use axum::{
    routing::get,
    Router,
};

use crate::shared::AppState;

// Internal modules
mod handle;
mod handlers;
mod memory;
pub mod models;
pub mod presence_sweeper;
pub mod repository;
mod service;
mod types;

/// Routes for the room directory admin surface
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(handlers::list_rooms).post(handlers::create_room))
        .route("/joined-rooms", get(handlers::joined_rooms))
        .route(
            "/rooms/:name",
            get(handlers::get_room)
                .put(handlers::find_room)
                .delete(handlers::delete_room),
        )
        .route("/health", get(handlers::health))
}
