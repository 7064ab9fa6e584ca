//! Session manager for a connected chat period.
//!
//! Wraps a `Session` with message counting against the session limit.

use geochat_types::session::Session;

/// Smallest accepted session message limit.
pub const MIN_MESSAGE_LIMIT: u32 = 1;

/// Manages the message counter of a single chat session.
pub struct SessionManager {
    session: Session,
}

impl SessionManager {
    /// Start a new session; the limit is floored at `MIN_MESSAGE_LIMIT`.
    pub fn start(participant_name: &str, server_uri: &str, message_limit: u32) -> Self {
        Self {
            session: Session::new(participant_name, server_uri, clamp_limit(message_limit)),
        }
    }

    /// Access the underlying session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn message_count(&self) -> u32 {
        self.session.message_count
    }

    pub fn message_limit(&self) -> u32 {
        self.session.message_limit
    }

    /// Count one sent message and return the new count.
    pub fn record_message(&mut self) -> u32 {
        self.session.message_count += 1;
        self.session.message_count
    }

    /// Whether the session has used up its message allowance.
    pub fn limit_reached(&self) -> bool {
        self.session.limit_reached()
    }

    pub fn set_message_limit(&mut self, limit: u32) {
        self.session.message_limit = clamp_limit(limit);
    }
}

/// Apply the `MIN_MESSAGE_LIMIT` floor.
pub fn clamp_limit(limit: u32) -> u32 {
    limit.max(MIN_MESSAGE_LIMIT)
}
