//! Chat connection controller.
//!
//! `ChatConnectionController` is the single owner of one logical chat
//! connection and of the session attached to it. It takes `&mut self` for
//! every mutating operation and does no internal locking: callers serialise
//! commands before they reach it.
//!
//! State machine:
//!
//! ```text
//! Disconnected --connect--> Connecting --ok--> Connected
//!                           Connecting --fail/timeout/cancel--> Disconnected
//! Connected --disconnect | leave | limit reached--> Disconnected
//! Connected --connect--> (implicit disconnect) --> Connecting --> ...
//! ```

use std::time::Duration;

use geochat_types::config::ChatConfig;
use geochat_types::connection::ConnectionState;
use geochat_types::error::{ChatError, TransportError};
use geochat_types::event::ChatEvent;
use geochat_types::session::{DEFAULT_MESSAGE_LIMIT, Session};
use tracing::{debug, info, warn};

use super::session::{SessionManager, clamp_limit};
use crate::event::EventSink;
use crate::transport::{ChatConnection, ChatTransport};

/// Default upper bound on a single connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shortest accepted connect timeout.
pub const MIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Owner of the outbound chat connection and its session state.
pub struct ChatConnectionController<T: ChatTransport, S: EventSink> {
    transport: T,
    sink: S,
    state: ConnectionState,
    connection: Option<T::Connection>,
    session: Option<SessionManager>,
    /// Limit applied to new sessions (and the live one on change).
    message_limit: u32,
    connect_timeout: Duration,
}

impl<T: ChatTransport, S: EventSink> ChatConnectionController<T, S> {
    pub fn new(transport: T, sink: S) -> Self {
        Self {
            transport,
            sink,
            state: ConnectionState::Disconnected,
            connection: None,
            session: None,
            message_limit: DEFAULT_MESSAGE_LIMIT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Build a controller with the limit and timeout taken from `config`.
    pub fn from_config(transport: T, sink: S, config: &ChatConfig) -> Self {
        let mut controller = Self::new(transport, sink);
        controller.set_message_limit(config.message_limit);
        controller.set_connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        controller
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// Snapshot of the live session, if connected.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref().map(SessionManager::session)
    }

    /// Messages sent in the live session (0 when disconnected).
    pub fn message_count(&self) -> u32 {
        self.session.as_ref().map_or(0, SessionManager::message_count)
    }

    pub fn message_limit(&self) -> u32 {
        self.message_limit
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Replace the session message limit (floored at 1).
    ///
    /// Applies to the live session as well as to future ones. If the live
    /// session has already sent `limit` messages, it closes after the next
    /// successful send.
    pub fn set_message_limit(&mut self, limit: u32) {
        let limit = clamp_limit(limit);
        if limit != self.message_limit {
            info!(old = self.message_limit, new = limit, "session message limit changed");
        }
        self.message_limit = limit;
        if let Some(session) = self.session.as_mut() {
            session.set_message_limit(limit);
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Replace the connect timeout (floored at `MIN_CONNECT_TIMEOUT`).
    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        if timeout < MIN_CONNECT_TIMEOUT {
            warn!(requested = ?timeout, floor = ?MIN_CONNECT_TIMEOUT, "connect timeout too short, using floor");
        }
        self.connect_timeout = timeout.max(MIN_CONNECT_TIMEOUT);
    }

    /// Open a connection to `server_uri` as `name`.
    ///
    /// An existing connection is torn down first. On any failure (empty or
    /// invalid address, unreachable server, timeout) the state returns to
    /// `Disconnected` and a single `ConnectionFailed` event is emitted.
    pub async fn connect(&mut self, server_uri: &str, name: &str) -> Result<(), ChatError> {
        if self.state.is_connected() {
            info!("already connected, reconnecting");
            self.disconnect().await;
        }

        let server_uri = server_uri.trim();
        let attempt = ConnectAttempt::begin(&mut self.state, &self.sink, server_uri);
        debug!(%server_uri, %name, "connecting to chat server");

        let opened = if server_uri.is_empty() {
            Err("server address is empty".to_string())
        } else {
            match tokio::time::timeout(self.connect_timeout, self.transport.open(server_uri, name)).await {
                Ok(Ok(connection)) => Ok(connection),
                Ok(Err(err)) => Err(err.to_string()),
                Err(_) => Err(format!("timed out after {:?}", self.connect_timeout)),
            }
        };

        match opened {
            Ok(connection) => {
                self.connection = Some(connection);
                self.session = Some(SessionManager::start(name, server_uri, self.message_limit));
                attempt.succeed();
                info!(%server_uri, %name, "connected to chat server");
                Ok(())
            }
            Err(reason) => {
                warn!(%server_uri, %reason, "connection attempt failed");
                attempt.fail(&reason);
                Err(ChatError::Connection {
                    server_uri: server_uri.to_string(),
                    reason,
                })
            }
        }
    }

    /// Tear down the connection. No-op when already disconnected.
    pub async fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            debug!("disconnect requested while already disconnected");
            return;
        }

        let server_uri = self
            .session
            .take()
            .map(|s| s.session().server_uri.clone())
            .unwrap_or_default();
        let connection = self.connection.take();

        // State settles before the transport is closed so a dropped future
        // cannot leave the controller half-connected.
        transition(&mut self.state, &self.sink, ConnectionState::Disconnected);
        self.sink.emit(ChatEvent::ConnectionClosed {
            server_uri: server_uri.clone(),
        });

        if let Some(connection) = connection {
            if let Err(err) = connection.close().await {
                warn!(%server_uri, error = %err, "error while closing chat connection");
            }
        }
        info!(%server_uri, "disconnected from chat server");
    }

    /// Announce that `name` leaves the chat, then disconnect.
    ///
    /// Delivery problems are reported as a `LeaveFailed` event and never
    /// prevent the disconnect.
    pub async fn leave(&mut self, name: &str) {
        let delivered = match self.connection.as_mut() {
            Some(connection) if self.state.is_connected() => connection
                .send_leave(name)
                .await
                .map_err(|err| err.to_string()),
            _ => Err("not connected".to_string()),
        };

        if let Err(reason) = delivered {
            warn!(%name, %reason, "leave notification not delivered");
            self.sink.emit(ChatEvent::LeaveFailed { reason });
        }

        self.disconnect().await;
    }

    /// Send `text` as `name` and return the session message count.
    ///
    /// Reaching the session limit disconnects and emits `SessionClosed`.
    /// A connection the server has already closed is torn down here, so the
    /// state returns to `Disconnected` with the usual events.
    pub async fn send(&mut self, name: &str, text: &str) -> Result<u32, ChatError> {
        if !self.state.is_connected() {
            return Err(ChatError::NotConnected);
        }
        let Some(connection) = self.connection.as_mut() else {
            return Err(ChatError::NotConnected);
        };

        if let Err(err) = connection.send_message(name, text).await {
            if matches!(err, TransportError::Closed) {
                warn!(%name, "chat connection closed by the server");
                self.disconnect().await;
            }
            return Err(ChatError::Transport(err.to_string()));
        }

        let Some(session) = self.session.as_mut() else {
            return Err(ChatError::NotConnected);
        };
        let count = session.record_message();
        let limit = session.message_limit();
        let limit_reached = session.limit_reached();
        debug!(%name, count, limit, "message sent");
        self.sink.emit(ChatEvent::MessageSent {
            name: name.to_string(),
            text: text.to_string(),
            count,
        });

        if limit_reached {
            info!(limit, "session message limit reached, closing session");
            self.disconnect().await;
            self.sink.emit(ChatEvent::session_closed(limit));
        }

        Ok(count)
    }
}

/// Move `state` to `to`, emitting `StateChanged` if it actually changed.
fn transition<S: EventSink>(state: &mut ConnectionState, sink: &S, to: ConnectionState) {
    let from = *state;
    if from == to {
        return;
    }
    *state = to;
    debug!(%from, %to, "connection state changed");
    sink.emit(ChatEvent::StateChanged { from, to });
}

/// An in-flight connection attempt.
///
/// Settles the `Connecting` state exactly once: on success, on failure, or on
/// drop if the connect future was cancelled.
struct ConnectAttempt<'a, S: EventSink> {
    state: &'a mut ConnectionState,
    sink: &'a S,
    server_uri: &'a str,
    settled: bool,
}

impl<'a, S: EventSink> ConnectAttempt<'a, S> {
    fn begin(state: &'a mut ConnectionState, sink: &'a S, server_uri: &'a str) -> Self {
        transition(state, sink, ConnectionState::Connecting);
        Self {
            state,
            sink,
            server_uri,
            settled: false,
        }
    }

    fn succeed(mut self) {
        self.settle(ConnectionState::Connected, None);
    }

    fn fail(mut self, reason: &str) {
        self.settle(ConnectionState::Disconnected, Some(reason));
    }

    fn settle(&mut self, to: ConnectionState, failure: Option<&str>) {
        if self.settled {
            return;
        }
        self.settled = true;
        transition(self.state, self.sink, to);
        if let Some(reason) = failure {
            self.sink.emit(ChatEvent::ConnectionFailed {
                server_uri: self.server_uri.to_string(),
                reason: reason.to_string(),
            });
        }
    }
}

impl<S: EventSink> Drop for ConnectAttempt<'_, S> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(server_uri = %self.server_uri, "connection attempt cancelled");
            self.settle(ConnectionState::Disconnected, Some("connection attempt cancelled"));
        }
    }
}
