use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::room::RoomDirectory;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RoomDirectory>,
}

impl AppState {
    pub fn new(directory: Arc<RoomDirectory>) -> Self {
        Self { directory }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Room '{0}' already exists")]
    AlreadyExists(String),

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid room name: {0:?}")]
    InvalidRoomName(String),

    #[error("Internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRoomName(_) => StatusCode::BAD_REQUEST,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}
