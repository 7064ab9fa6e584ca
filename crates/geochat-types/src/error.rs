use thiserror::Error;

/// Errors surfaced by the connection controller and command dispatcher.
///
/// None of these are fatal to the hosting process; the dispatcher logs them
/// and keeps serving commands.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("connection to '{server_uri}' failed: {reason}")]
    Connection { server_uri: String, reason: String },

    #[error("not connected")]
    NotConnected,

    #[error("unknown command code {0}")]
    UnknownCommand(i32),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors reported by a chat transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid server address: '{0}'")]
    InvalidAddress(String),

    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("connection closed")]
    Closed,

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Errors from message store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}
