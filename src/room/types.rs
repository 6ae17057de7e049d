use serde::{Deserialize, Serialize};

use super::models::RoomOptions;

/// Request payload for creating a new room
#[derive(Debug, Deserialize)]
pub struct RoomCreateRequest {
    pub name: String,
    #[serde(default)]
    pub options: RoomOptions,
}

/// Response for room creation and lookup
#[derive(Debug, Serialize, Deserialize)]
pub struct RoomResponse {
    pub name: String,
}

/// Response for the health endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub sweeper: String,
    pub room_count: usize,
}
