//! Chat session snapshot.
//!
//! A session covers one continuous connected period. It is created when a
//! connection is established and discarded when that connection goes away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of messages a participant may send in one session.
pub const DEFAULT_MESSAGE_LIMIT: u32 = 2;

/// State of one connected period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Time-sortable session identifier.
    pub id: Uuid,
    /// Name the participant joined with.
    pub participant_name: String,
    /// Server address the connection was opened against.
    pub server_uri: String,
    /// Number of messages after which the session is closed.
    pub message_limit: u32,
    /// Messages sent so far in this session.
    pub message_count: u32,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Start a fresh session with a zeroed message counter.
    pub fn new(participant_name: impl Into<String>, server_uri: impl Into<String>, message_limit: u32) -> Self {
        Self {
            id: Uuid::now_v7(),
            participant_name: participant_name.into(),
            server_uri: server_uri.into(),
            message_limit,
            message_count: 0,
            started_at: Utc::now(),
        }
    }

    /// Whether the message counter has reached the limit.
    pub fn limit_reached(&self) -> bool {
        self.message_count >= self.message_limit
    }
}
