//! Chat transport port.
//!
//! The controller never touches sockets directly. It opens connections through
//! a `ChatTransport` and talks over the returned `ChatConnection`. Uses native
//! async fn in traits (RPITIT, Rust 2024 edition).
//!
//! Implementations live in geochat-infra (e.g., `WsTransport`). Any retry or
//! backoff policy belongs to the implementation, not to the controller.

use std::future::Future;

use geochat_types::error::TransportError;

/// Factory for outbound chat connections.
pub trait ChatTransport: Send + Sync {
    type Connection: ChatConnection;

    /// Open a connection to `server_uri` and announce `name` to the server.
    fn open(
        &self,
        server_uri: &str,
        name: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// One established chat connection.
pub trait ChatConnection: Send + Sized {
    /// Transmit a chat message on behalf of `name`.
    fn send_message(
        &mut self,
        name: &str,
        text: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Tell the server that `name` is leaving the chat.
    fn send_leave(&mut self, name: &str) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Tear the connection down.
    fn close(self) -> impl Future<Output = Result<(), TransportError>> + Send;
}
