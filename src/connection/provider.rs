use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Handle to the live protocol session rooms talk through
///
/// Cheap to clone. The directory hands it to new rooms untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionHandle {
    session_id: Uuid,
    service_address: String,
    connected_at: DateTime<Utc>,
}

impl ConnectionHandle {
    /// Creates a handle for a freshly established session
    pub fn new(service_address: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            service_address: service_address.into(),
            connected_at: Utc::now(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn service_address(&self) -> &str {
        &self.service_address
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }
}

/// Supplies the current connection handle of the owning protocol session
pub trait ConnectionProvider: Send + Sync {
    fn connection(&self) -> ConnectionHandle;
}

/// Provider that always yields the same handle
pub struct StaticConnectionProvider {
    handle: ConnectionHandle,
}

impl StaticConnectionProvider {
    pub fn new(handle: ConnectionHandle) -> Self {
        Self { handle }
    }
}

impl ConnectionProvider for StaticConnectionProvider {
    fn connection(&self) -> ConnectionHandle {
        self.handle.clone()
    }
}
