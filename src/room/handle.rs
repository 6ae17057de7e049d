use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::models::{RoomName, RoomOptions};
use super::repository::DirectoryLink;
use crate::connection::ConnectionHandle;

/// Errors a single room can raise while purging stale occupants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurgeError {
    #[error("Purge failed: {0}")]
    Failed(String),

    #[error("Purge timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Purge panicked: {0}")]
    Panicked(String),
}

impl PurgeError {
    pub fn failed(msg: impl Into<String>) -> Self {
        PurgeError::Failed(msg.into())
    }
}

/// A named conference room as seen by the directory
///
/// The directory only needs the room's name and a way to ask it to drop
/// occupants it no longer considers present. Occupant tracking and the
/// presence policy belong to the implementation.
#[async_trait]
pub trait Room: Send + Sync {
    /// Normalized name this room is registered under
    fn name(&self) -> &RoomName;

    /// Removes occupants the room considers offline and returns how many were dropped
    ///
    /// Must be idempotent and return `Ok(0)` when there is nothing to purge.
    async fn purge_stale_occupants(&self) -> Result<usize, PurgeError>;
}

/// Everything a factory needs to bind a new room to its directory
#[derive(Debug, Clone)]
pub struct RoomContext {
    pub name: RoomName,
    pub options: RoomOptions,
    pub connection: ConnectionHandle,
    pub link: DirectoryLink,
}

/// Constructs rooms on behalf of the directory
pub trait RoomFactory: Send + Sync {
    fn build(&self, context: RoomContext) -> Arc<dyn Room>;
}
