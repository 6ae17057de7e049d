#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use muc_directory::{
    room::DirectoryLink, ConnectionHandle, PurgeError, Room, RoomContext, RoomFactory, RoomName,
};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// What a probe room does when asked to purge
#[derive(Debug, Clone)]
pub enum PurgeBehaviour {
    Succeed(usize),
    Fail,
    Hang,
    Panic,
    Slow(Duration),
    /// Blocks the worker thread instead of yielding
    Block(Duration),
}

pub struct ProbeRoom {
    name: RoomName,
    behaviour: PurgeBehaviour,
    connection: ConnectionHandle,
    link: DirectoryLink,
    calls: AtomicUsize,
    completed: AtomicUsize,
}

impl ProbeRoom {
    /// Number of purge calls started
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of purge calls that ran to completion
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub fn link(&self) -> &DirectoryLink {
        &self.link
    }
}

#[async_trait]
impl Room for ProbeRoom {
    fn name(&self) -> &RoomName {
        &self.name
    }

    async fn purge_stale_occupants(&self) -> Result<usize, PurgeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let result = match &self.behaviour {
            PurgeBehaviour::Succeed(n) => Ok(*n),
            PurgeBehaviour::Fail => Err(PurgeError::failed("presence store unavailable")),
            PurgeBehaviour::Hang => {
                futures::future::pending::<()>().await;
                Ok(0)
            }
            PurgeBehaviour::Panic => panic!("probe room panicked"),
            PurgeBehaviour::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(0)
            }
            PurgeBehaviour::Block(delay) => {
                std::thread::sleep(*delay);
                Ok(0)
            }
        };

        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Factory that builds probe rooms and remembers every room it built
#[derive(Default)]
pub struct ProbeRoomFactory {
    behaviours: Mutex<HashMap<String, PurgeBehaviour>>,
    built: Mutex<Vec<Arc<ProbeRoom>>>,
}

impl ProbeRoomFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets the behaviour of rooms later built under `name` (normalized form)
    pub fn set_behaviour(&self, name: &str, behaviour: PurgeBehaviour) {
        self.behaviours
            .lock()
            .unwrap()
            .insert(name.to_string(), behaviour);
    }

    pub fn build_count(&self) -> usize {
        self.built.lock().unwrap().len()
    }

    /// Most recently built room with the given normalized name
    pub fn room(&self, name: &str) -> Option<Arc<ProbeRoom>> {
        self.built
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|room| room.name.as_str() == name)
            .cloned()
    }

    pub fn total_calls(&self) -> usize {
        self.built.lock().unwrap().iter().map(|r| r.calls()).sum()
    }
}

impl RoomFactory for ProbeRoomFactory {
    fn build(&self, context: RoomContext) -> Arc<dyn Room> {
        let behaviour = self
            .behaviours
            .lock()
            .unwrap()
            .get(context.name.as_str())
            .cloned()
            .unwrap_or(PurgeBehaviour::Succeed(0));

        let room = Arc::new(ProbeRoom {
            name: context.name,
            behaviour,
            connection: context.connection,
            link: context.link,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        });

        self.built.lock().unwrap().push(Arc::clone(&room));
        room
    }
}
