use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, warn};

use super::handle::Room;
use super::models::RoomName;
use crate::shared::AppError;

/// Registry of live rooms keyed by normalized name
///
/// Every read and write goes through the same mutex. Critical sections are
/// single map operations and never call into room code.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomName, Arc<dyn Room>>>,
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    // The map is never left half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<RoomName, Arc<dyn Room>>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, name: &RoomName) -> Option<Arc<dyn Room>> {
        self.lock().get(name).cloned()
    }

    pub fn contains(&self, name: &RoomName) -> bool {
        self.lock().contains_key(name)
    }

    /// Registers `room` under `name`, failing if the name is already taken
    pub fn try_insert(&self, name: RoomName, room: Arc<dyn Room>) -> Result<(), AppError> {
        match self.lock().entry(name) {
            Entry::Occupied(entry) => {
                warn!(room = %entry.key(), "Room already registered");
                Err(AppError::AlreadyExists(entry.key().to_string()))
            }
            Entry::Vacant(entry) => {
                debug!(room = %entry.key(), "Room registered");
                entry.insert(room);
                Ok(())
            }
        }
    }

    /// Registers `room` unless another caller got there first
    ///
    /// Returns the registered room and whether it is the one passed in.
    pub fn get_or_insert(&self, name: RoomName, room: Arc<dyn Room>) -> (Arc<dyn Room>, bool) {
        match self.lock().entry(name) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                debug!(room = %entry.key(), "Room registered");
                (Arc::clone(entry.insert(room)), true)
            }
        }
    }

    pub fn remove(&self, name: &RoomName) -> Option<Arc<dyn Room>> {
        self.lock().remove(name)
    }

    /// Whether `room` is still the instance registered under `name`
    pub fn is_registered(&self, name: &RoomName, room: &Arc<dyn Room>) -> bool {
        self.lock()
            .get(name)
            .is_some_and(|current| same_room(current, room))
    }

    /// Point-in-time copy of all registered names
    pub fn names(&self) -> Vec<RoomName> {
        self.lock().keys().cloned().collect()
    }

    /// Point-in-time copy of all registered rooms
    pub fn snapshot(&self) -> Vec<(RoomName, Arc<dyn Room>)> {
        self.lock()
            .iter()
            .map(|(name, room)| (name.clone(), Arc::clone(room)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Compares room instances by address, ignoring vtable metadata
pub fn same_room(a: &Arc<dyn Room>, b: &Arc<dyn Room>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Weak back-reference from a room to the registry that holds it
///
/// Lets a room drop its own registration once it considers itself defunct,
/// without keeping the directory alive.
#[derive(Clone, Default)]
pub struct DirectoryLink {
    registry: Weak<RoomRegistry>,
}

impl DirectoryLink {
    pub fn new(registry: &Arc<RoomRegistry>) -> Self {
        Self {
            registry: Arc::downgrade(registry),
        }
    }

    /// A link that is not attached to any registry
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.registry.strong_count() > 0
    }

    /// Removes `name` from the linked registry. Returns false if nothing was removed.
    pub fn remove_room(&self, name: &RoomName) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.remove(name).is_some(),
            None => {
                debug!(room = %name, "Directory already gone, nothing to remove");
                false
            }
        }
    }
}

impl fmt::Debug for DirectoryLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryLink")
            .field("attached", &self.is_attached())
            .finish()
    }
}
