use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument, warn};

use super::{
    handle::{Room, RoomContext, RoomFactory},
    models::{RoomInvitation, RoomName, RoomOptions},
    presence_sweeper::{
        start_presence_sweeper, sweep_rooms, SweepConfig, SweepReport, SweeperHandle,
        SweeperState,
    },
    repository::{DirectoryLink, RoomRegistry},
};
use crate::{
    connection::{ConnectionHandle, ConnectionProvider},
    shared::AppError,
};

/// Directory of the chat rooms owned by one protocol session
///
/// Maps normalized room names to rooms and owns the background presence
/// sweeper. The sweeper starts with the directory and runs until `shutdown`
/// is called or the directory is dropped.
pub struct RoomDirectory {
    registry: Arc<RoomRegistry>,
    provider: Arc<dyn ConnectionProvider>,
    factory: Arc<dyn RoomFactory>,
    config: SweepConfig,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl RoomDirectory {
    /// Creates the directory and starts its presence sweeper
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        provider: Arc<dyn ConnectionProvider>,
        factory: Arc<dyn RoomFactory>,
        config: SweepConfig,
    ) -> Arc<Self> {
        let registry = Arc::new(RoomRegistry::new());
        let sweeper = start_presence_sweeper(Arc::clone(&registry), config.clone());

        Arc::new(Self {
            registry,
            provider,
            factory,
            config,
            sweeper: Mutex::new(Some(sweeper)),
        })
    }

    /// Snapshot of all registered room names, in no particular order
    pub fn list_room_names(&self) -> Vec<RoomName> {
        self.registry.names()
    }

    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Creates and registers a new room
    ///
    /// Fails with `AlreadyExists` if a room with the same normalized name is
    /// registered, including one created concurrently by another caller.
    #[instrument(skip(self, options))]
    pub fn create_room(&self, name: &str, options: RoomOptions) -> Result<Arc<dyn Room>, AppError> {
        let name = RoomName::parse(name)?;

        if self.registry.contains(&name) {
            warn!(room = %name, "Refusing to create room that already exists");
            return Err(AppError::AlreadyExists(name.to_string()));
        }

        let room = self.build_room(name.clone(), options);
        self.registry.try_insert(name.clone(), Arc::clone(&room))?;

        info!(room = %name, "Room created");
        Ok(room)
    }

    /// Returns the registered room, creating it with no options if absent
    #[instrument(skip(self))]
    pub fn find_or_create_room(&self, name: &str) -> Result<Arc<dyn Room>, AppError> {
        let name = RoomName::parse(name)?;

        if let Some(room) = self.registry.get(&name) {
            debug!(room = %name, "Room found");
            return Ok(room);
        }

        let candidate = self.build_room(name.clone(), RoomOptions::default());
        let (room, created) = self.registry.get_or_insert(name.clone(), candidate);

        if created {
            info!(room = %name, "Room created on lookup");
        } else {
            debug!(room = %name, "Room created concurrently, using registered instance");
        }

        Ok(room)
    }

    /// Find-or-create lookup under its historical name
    pub fn find_room(&self, name: &str) -> Result<Arc<dyn Room>, AppError> {
        self.find_or_create_room(name)
    }

    /// Strict lookup that never creates
    pub fn lookup_room(&self, name: &str) -> Option<Arc<dyn Room>> {
        let name = RoomName::parse(name).ok()?;
        self.registry.get(&name)
    }

    /// Unregisters `room`. Returns false if no room was registered under its name.
    pub fn remove_room(&self, room: &dyn Room) -> bool {
        self.remove_registered(room.name())
    }

    /// Unregisters the room with the given name, if any
    pub fn remove_room_by_name(&self, name: &str) -> bool {
        match RoomName::parse(name) {
            Ok(name) => self.remove_registered(&name),
            Err(_) => false,
        }
    }

    fn remove_registered(&self, name: &RoomName) -> bool {
        let removed = self.registry.remove(name).is_some();
        if removed {
            info!(room = %name, "Room removed");
        } else {
            debug!(room = %name, "Room not registered, nothing to remove");
        }
        removed
    }

    fn build_room(&self, name: RoomName, options: RoomOptions) -> Arc<dyn Room> {
        self.factory.build(RoomContext {
            name,
            options,
            connection: self.provider.connection(),
            link: DirectoryLink::new(&self.registry),
        })
    }

    /// Current connection of the owning protocol session
    pub fn connection(&self) -> ConnectionHandle {
        self.provider.connection()
    }

    pub fn connection_provider(&self) -> Arc<dyn ConnectionProvider> {
        Arc::clone(&self.provider)
    }

    pub fn currently_joined_rooms(&self) -> Result<Vec<Arc<dyn Room>>, AppError> {
        Err(AppError::NotImplemented("currently joined rooms"))
    }

    pub fn currently_joined_rooms_of(&self, _member: &str) -> Result<Vec<RoomName>, AppError> {
        Err(AppError::NotImplemented("rooms joined by member"))
    }

    pub fn reject_invitation(
        &self,
        _invitation: &RoomInvitation,
        _reason: &str,
    ) -> Result<(), AppError> {
        Err(AppError::NotImplemented("invitation rejection"))
    }

    pub fn is_multi_chat_supported_by_contact(&self, _contact: &str) -> Result<bool, AppError> {
        Err(AppError::NotImplemented("multi-chat capability query"))
    }

    pub fn is_private_messaging_contact(&self, _address: &str) -> Result<bool, AppError> {
        Err(AppError::NotImplemented("private messaging contact query"))
    }

    /// Runs one sweep tick on the calling task
    pub async fn sweep_now(&self) -> SweepReport {
        sweep_rooms(&self.registry, self.config.purge_timeout).await
    }

    pub fn sweeper_state(&self) -> SweeperState {
        self.sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(SweeperState::Stopped, SweeperHandle::state)
    }

    /// Stops the presence sweeper, waiting for a running tick to finish
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) {
        let handle = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            info!(room_count = self.registry.len(), "Shutting down room directory");
            handle.stop().await;
        }
    }
}
