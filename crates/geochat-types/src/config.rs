//! Chat configuration types.
//!
//! `ChatConfig` represents the `config.toml` that supplies the participant
//! name, the server address and the session message limit.

use serde::{Deserialize, Serialize};

use crate::session::DEFAULT_MESSAGE_LIMIT;

/// Participant name used when none is configured.
pub const DEFAULT_USER_NAME: &str = "Default Name";

/// Top-level configuration for the chat host.
///
/// Loaded from `~/.geochat/config.toml`. Every field except `server_uri` has a
/// default; a join without a server address fails at connect time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_user_name")]
    pub user_name: String,

    /// Chat server address (e.g. `ws://chat.example.com:3000`).
    #[serde(default)]
    pub server_uri: Option<String>,

    /// Messages allowed per session before it is closed.
    #[serde(default = "default_message_limit")]
    pub message_limit: u32,

    /// Upper bound on a single connection attempt.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

fn default_message_limit() -> u32 {
    DEFAULT_MESSAGE_LIMIT
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_name: default_user_name(),
            server_uri: None,
            message_limit: default_message_limit(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}
