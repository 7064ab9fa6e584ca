//! Event types emitted by the connection controller.
//!
//! `ChatEvent` is the unified event type delivered to event sinks (UI,
//! notification and storage layers). All variants are Clone + Send + Sync for
//! use with tokio broadcast channels.

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionState;

/// Events emitted over the lifetime of a chat connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A chat message arrived from the server.
    NewMessage { text: String },

    /// A message was transmitted by the local participant.
    MessageSent {
        name: String,
        text: String,
        /// Session message count after this send.
        count: u32,
    },

    /// The session was closed because the message limit was reached.
    SessionClosed { limit: u32, message: String },

    /// The connection moved from one state to another.
    StateChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A connection attempt failed (invalid address, unreachable, timeout).
    ConnectionFailed { server_uri: String, reason: String },

    /// An established connection was torn down.
    ConnectionClosed { server_uri: String },

    /// The leave notification could not be delivered.
    LeaveFailed { reason: String },
}

impl ChatEvent {
    /// Build the session-closed event for the given limit.
    pub fn session_closed(limit: u32) -> Self {
        ChatEvent::SessionClosed {
            limit,
            message: session_closed_message(limit),
        }
    }

    /// Short label used in log fields and storage.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatEvent::NewMessage { .. } => "new_message",
            ChatEvent::MessageSent { .. } => "message_sent",
            ChatEvent::SessionClosed { .. } => "session_closed",
            ChatEvent::StateChanged { .. } => "state_changed",
            ChatEvent::ConnectionFailed { .. } => "connection_failed",
            ChatEvent::ConnectionClosed { .. } => "connection_closed",
            ChatEvent::LeaveFailed { .. } => "leave_failed",
        }
    }
}

/// Human-readable notice for a session closed by the message limit.
pub fn session_closed_message(limit: u32) -> String {
    format!("Session closed after reaching the limit: {limit} messages")
}
