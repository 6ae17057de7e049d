use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::handle::{PurgeError, Room, RoomContext, RoomFactory};
use super::models::{RoomName, RoomOptions};
use super::repository::DirectoryLink;
use crate::connection::ConnectionHandle;

/// Occupant of an in-memory room
#[derive(Debug, Clone, Serialize)]
pub struct Occupant {
    pub nickname: String,
    pub online: bool,
    pub joined_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// In-process room that tracks occupants by nickname
///
/// Presence is pushed in from outside through `set_presence`; a purge drops
/// every occupant currently marked offline. Reference room for tests and the
/// admin binary: nothing in the binary adds occupants, so its sweeps purge
/// nothing until a real presence source drives `join` and `set_presence`.
pub struct MemoryRoom {
    name: RoomName,
    options: RoomOptions,
    connection: ConnectionHandle,
    link: DirectoryLink,
    occupants: Mutex<HashMap<String, Occupant>>,
}

impl MemoryRoom {
    pub fn new(context: RoomContext) -> Self {
        Self {
            name: context.name,
            options: context.options,
            connection: context.connection,
            link: context.link,
            occupants: Mutex::new(HashMap::new()),
        }
    }

    fn occupants_lock(&self) -> MutexGuard<'_, HashMap<String, Occupant>> {
        self.occupants.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an occupant, or marks an existing one online again
    pub fn join(&self, nickname: &str) {
        let now = Utc::now();
        let mut occupants = self.occupants_lock();
        occupants
            .entry(nickname.to_string())
            .and_modify(|o| {
                o.online = true;
                o.last_seen = now;
            })
            .or_insert_with(|| Occupant {
                nickname: nickname.to_string(),
                online: true,
                joined_at: now,
                last_seen: now,
            });
        debug!(room = %self.name, nickname = %nickname, "Occupant joined");
    }

    /// Updates an occupant's presence. Returns false for unknown nicknames.
    pub fn set_presence(&self, nickname: &str, online: bool) -> bool {
        match self.occupants_lock().get_mut(nickname) {
            Some(occupant) => {
                occupant.online = online;
                if online {
                    occupant.last_seen = Utc::now();
                }
                true
            }
            None => false,
        }
    }

    pub fn leave(&self, nickname: &str) -> bool {
        self.occupants_lock().remove(nickname).is_some()
    }

    pub fn occupants(&self) -> Vec<Occupant> {
        self.occupants_lock().values().cloned().collect()
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants_lock().len()
    }

    pub fn options(&self) -> &RoomOptions {
        &self.options
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    /// Drops this room's directory registration
    pub fn destroy(&self) -> bool {
        info!(room = %self.name, "Destroying room");
        self.link.remove_room(&self.name)
    }
}

#[async_trait]
impl Room for MemoryRoom {
    fn name(&self) -> &RoomName {
        &self.name
    }

    async fn purge_stale_occupants(&self) -> Result<usize, PurgeError> {
        let mut occupants = self.occupants_lock();
        let before = occupants.len();
        occupants.retain(|_, o| o.online);
        Ok(before - occupants.len())
    }
}

/// Builds `MemoryRoom`s
#[derive(Debug, Default)]
pub struct MemoryRoomFactory;

impl RoomFactory for MemoryRoomFactory {
    fn build(&self, context: RoomContext) -> Arc<dyn Room> {
        Arc::new(MemoryRoom::new(context))
    }
}
