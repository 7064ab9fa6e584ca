//! Infrastructure implementations for GeoChat.
//!
//! Concrete adapters for the ports defined in `geochat-core`: the WebSocket
//! chat transport, the SQLite message store, configuration loading and
//! watching, and the keep-alive used by the host.

pub mod config;
pub mod filesystem;
pub mod keepalive;
pub mod sqlite;
pub mod transport;
pub mod watcher;
