//! Stored chat message types.
//!
//! The message store keeps a history of what was said in (and about) chat
//! sessions: messages from other participants, messages the local
//! participant sent, and system notices such as a session being closed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::event::ChatEvent;

/// Origin of a stored message.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (kind IN ('incoming', 'outgoing', 'system'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Incoming,
    Outgoing,
    System,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Incoming => write!(f, "incoming"),
            MessageKind::Outgoing => write!(f, "outgoing"),
            MessageKind::System => write!(f, "system"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incoming" => Ok(MessageKind::Incoming),
            "outgoing" => Ok(MessageKind::Outgoing),
            "system" => Ok(MessageKind::System),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// One entry of the chat history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: Uuid,
    pub kind: MessageKind,
    /// Participant who sent it, when known.
    pub sender: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Build the history entry for an event, if the event is one that
    /// belongs in the chat history.
    pub fn from_event(event: &ChatEvent) -> Option<Self> {
        let (kind, sender, body) = match event {
            ChatEvent::NewMessage { text } => (MessageKind::Incoming, None, text.clone()),
            ChatEvent::MessageSent { name, text, .. } => {
                (MessageKind::Outgoing, Some(name.clone()), text.clone())
            }
            ChatEvent::SessionClosed { message, .. } => (MessageKind::System, None, message.clone()),
            _ => return None,
        };
        Some(Self {
            id: Uuid::now_v7(),
            kind,
            sender,
            body,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionState;

    #[test]
    fn test_message_kind_display_from_str() {
        for kind in [MessageKind::Incoming, MessageKind::Outgoing, MessageKind::System] {
            assert_eq!(kind.to_string().parse::<MessageKind>().unwrap(), kind);
        }
        assert!("broadcast".parse::<MessageKind>().is_err());
    }

    #[test]
    fn test_from_event_outgoing_keeps_sender() {
        let stored = StoredMessage::from_event(&ChatEvent::MessageSent {
            name: "alice".into(),
            text: "hi".into(),
            count: 1,
        })
        .unwrap();
        assert_eq!(stored.kind, MessageKind::Outgoing);
        assert_eq!(stored.sender.as_deref(), Some("alice"));
        assert_eq!(stored.body, "hi");
    }

    #[test]
    fn test_from_event_session_closed_is_system_notice() {
        let stored = StoredMessage::from_event(&ChatEvent::session_closed(2)).unwrap();
        assert_eq!(stored.kind, MessageKind::System);
        assert_eq!(stored.body, "Session closed after reaching the limit: 2 messages");
    }

    #[test]
    fn test_from_event_skips_lifecycle_events() {
        let event = ChatEvent::StateChanged {
            from: ConnectionState::Connected,
            to: ConnectionState::Disconnected,
        };
        assert!(StoredMessage::from_event(&event).is_none());
    }
}
