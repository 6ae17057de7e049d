use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument};

use super::types::{HealthResponse, RoomCreateRequest, RoomResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for listing room names
///
/// GET /rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<String>> {
    let names: Vec<String> = state
        .directory
        .list_room_names()
        .into_iter()
        .map(String::from)
        .collect();

    info!(room_count = names.len(), "Rooms listed");

    Json(names)
}

/// HTTP handler for strict room creation
///
/// POST /rooms
/// Returns 409 if a room with the same normalized name exists
#[instrument(name = "create_room", skip(state))]
pub async fn create_room(
    State(state): State<AppState>,
    Json(request): Json<RoomCreateRequest>,
) -> Result<(StatusCode, Json<RoomResponse>), AppError> {
    info!(name = %request.name, "Creating room");

    let room = state
        .directory
        .create_room(&request.name, request.options)?;

    Ok((
        StatusCode::CREATED,
        Json(RoomResponse {
            name: room.name().to_string(),
        }),
    ))
}

/// HTTP handler for find-or-create
///
/// PUT /rooms/:name
#[instrument(name = "find_room", skip(state))]
pub async fn find_room(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state.directory.find_or_create_room(&name)?;

    Ok(Json(RoomResponse {
        name: room.name().to_string(),
    }))
}

/// HTTP handler for strict lookup
///
/// GET /rooms/:name
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RoomResponse>, AppError> {
    let room = state
        .directory
        .lookup_room(&name)
        .ok_or(AppError::NotFound(name))?;

    Ok(Json(RoomResponse {
        name: room.name().to_string(),
    }))
}

/// HTTP handler for removing a room
///
/// DELETE /rooms/:name
/// Always 204; removing an unknown room is not an error
#[instrument(name = "delete_room", skip(state))]
pub async fn delete_room(State(state): State<AppState>, Path(name): Path<String>) -> StatusCode {
    state.directory.remove_room_by_name(&name);
    StatusCode::NO_CONTENT
}

/// GET /joined-rooms
#[instrument(name = "joined_rooms", skip(state))]
pub async fn joined_rooms(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let rooms = state.directory.currently_joined_rooms()?;

    Ok(Json(
        rooms.iter().map(|room| room.name().to_string()).collect(),
    ))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        sweeper: state.directory.sweeper_state().to_string(),
        room_count: state.directory.room_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::routes;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{body::Body, http::Request, Router};
    use tower::ServiceExt; // for `oneshot`

    fn app(state: AppState) -> Router {
        routes().with_state(state)
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_create_room_handler() {
        let app_state = AppStateBuilder::new().build();
        let directory = app_state.directory.clone();

        let request = Request::builder()
            .method("POST")
            .uri("/rooms")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "Lobby", "options": {"persistent": true}}"#))
            .unwrap();

        let response = app(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let room: RoomResponse = body_json(response).await;
        assert_eq!(room.name, "lobby");
        assert!(directory.lookup_room("lobby").is_some());
    }

    #[tokio::test]
    async fn test_create_room_handler_conflict() {
        let app_state = AppStateBuilder::new().build();
        app_state
            .directory
            .create_room("lobby", Default::default())
            .unwrap();

        let request = Request::builder()
            .method("POST")
            .uri("/rooms")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "LOBBY"}"#))
            .unwrap();

        let response = app(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = body_json(response).await;
        assert_eq!(body["error"], "Room 'lobby' already exists");
    }

    #[tokio::test]
    async fn test_create_room_handler_blank_name() {
        let app_state = AppStateBuilder::new().build();

        let request = Request::builder()
            .method("POST")
            .uri("/rooms")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name": "   "}"#))
            .unwrap();

        let response = app(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_room_handler_missing_name() {
        let app_state = AppStateBuilder::new().build();

        let request = Request::builder()
            .method("POST")
            .uri("/rooms")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"options": {}}"#))
            .unwrap();

        let response = app(app_state).oneshot(request).await.unwrap();

        // Should return 422 Unprocessable Entity for invalid JSON structure
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_get_room_handler_not_found() {
        let app_state = AppStateBuilder::new().build();

        let request = Request::builder()
            .uri("/rooms/ghost")
            .body(Body::empty())
            .unwrap();

        let response = app(app_state.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(app_state.directory.room_count(), 0);
    }

    #[tokio::test]
    async fn test_joined_rooms_handler_not_implemented() {
        let app_state = AppStateBuilder::new().build();

        let request = Request::builder()
            .uri("/joined-rooms")
            .body(Body::empty())
            .unwrap();

        let response = app(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let app_state = AppStateBuilder::new()
            .with_factory(std::sync::Arc::new(crate::room::MemoryRoomFactory))
            .build();
        app_state.directory.find_room("lobby").unwrap();

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app(app_state).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthResponse = body_json(response).await;
        assert_eq!(health.sweeper, "running");
        assert_eq!(health.room_count, 1);
    }
}
