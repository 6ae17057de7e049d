// Public API - what other modules can use
pub use provider::{ConnectionHandle, ConnectionProvider, StaticConnectionProvider};

// Internal modules
mod provider;
