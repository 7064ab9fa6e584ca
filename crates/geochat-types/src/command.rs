//! Inbound commands.
//!
//! Commands arrive as loosely typed records (`RawCommand`) carrying a numeric
//! command code. They are decoded into the strongly typed `Command` before
//! reaching the controller.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Command code for joining the chat.
pub const CMD_JOIN_CHAT: i32 = 10;
/// Command code for leaving the chat.
pub const CMD_LEAVE_CHAT: i32 = 20;
/// Command code for sending a message.
pub const CMD_SEND_MESSAGE: i32 = 30;

/// Wire shape of an inbound command: `{cmd, name?, serverUri?, text?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCommand {
    pub cmd: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A decoded chat command.
///
/// Missing names and server addresses are filled in from configuration by
/// the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Join {
        name: Option<String>,
        server_uri: Option<String>,
    },
    Leave {
        name: Option<String>,
    },
    Send {
        name: Option<String>,
        text: String,
    },
}

impl Command {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Join { .. } => "join",
            Command::Leave { .. } => "leave",
            Command::Send { .. } => "send",
        }
    }
}

impl TryFrom<RawCommand> for Command {
    type Error = ChatError;

    fn try_from(raw: RawCommand) -> Result<Self, Self::Error> {
        match raw.cmd {
            CMD_JOIN_CHAT => Ok(Command::Join {
                name: raw.name,
                server_uri: raw.server_uri,
            }),
            CMD_LEAVE_CHAT => Ok(Command::Leave { name: raw.name }),
            CMD_SEND_MESSAGE => {
                let text = raw.text.ok_or_else(|| {
                    ChatError::InvalidCommand("send command without message text".to_string())
                })?;
                Ok(Command::Send {
                    name: raw.name,
                    text,
                })
            }
            other => Err(ChatError::UnknownCommand(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_command_parses_camel_case() {
        let raw: RawCommand =
            serde_json::from_str(r#"{"cmd":10,"name":"alice","serverUri":"ws://chat:3000"}"#).unwrap();
        assert_eq!(raw.cmd, CMD_JOIN_CHAT);
        assert_eq!(raw.server_uri.as_deref(), Some("ws://chat:3000"));
        assert!(raw.text.is_none());
    }

    #[test]
    fn test_decode_join() {
        let raw = RawCommand {
            cmd: 10,
            name: Some("alice".into()),
            server_uri: None,
            text: None,
        };
        let cmd = Command::try_from(raw).unwrap();
        assert_eq!(
            cmd,
            Command::Join {
                name: Some("alice".into()),
                server_uri: None
            }
        );
        assert_eq!(cmd.kind(), "join");
    }

    #[test]
    fn test_decode_leave_and_send() {
        let leave = Command::try_from(RawCommand {
            cmd: 20,
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(leave, Command::Leave { name: None }));

        let send = Command::try_from(RawCommand {
            cmd: 30,
            text: Some("hi".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(send, Command::Send { ref text, .. } if text == "hi"));
    }

    #[test]
    fn test_decode_send_without_text_is_invalid() {
        let err = Command::try_from(RawCommand {
            cmd: 30,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ChatError::InvalidCommand(_)));
    }

    #[test]
    fn test_decode_unknown_code() {
        let err = Command::try_from(RawCommand {
            cmd: 99,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ChatError::UnknownCommand(99)));
    }
}
