//! Command dispatcher.
//!
//! Translates inbound commands into controller calls. This is the layer that
//! hosts the controller: it holds the keep-alive while commands are being
//! served and applies configuration reloads. Errors never escape it; they are
//! logged and the host keeps running.

use std::sync::Arc;
use std::time::Duration;

use geochat_types::command::{Command, RawCommand};
use geochat_types::config::ChatConfig;
use geochat_types::error::ChatError;
use tracing::{debug, info, warn};

use super::controller::ChatConnectionController;
use crate::event::EventSink;
use crate::keepalive::{KeepAlive, KeepAliveGuard};
use crate::transport::ChatTransport;

/// What the host should do after a command has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// The participant left; the host should shut down.
    Stop,
}

/// Maps each inbound command onto exactly one controller interaction.
pub struct CommandDispatcher<T: ChatTransport, S: EventSink> {
    controller: ChatConnectionController<T, S>,
    config: ChatConfig,
    keep_alive: Arc<dyn KeepAlive>,
    /// Held from the first command until the dispatcher is dropped.
    keep_alive_guard: Option<KeepAliveGuard>,
}

impl<T: ChatTransport, S: EventSink> CommandDispatcher<T, S> {
    pub fn new(transport: T, sink: S, config: ChatConfig, keep_alive: Arc<dyn KeepAlive>) -> Self {
        let controller = ChatConnectionController::from_config(transport, sink, &config);
        Self {
            controller,
            config,
            keep_alive,
            keep_alive_guard: None,
        }
    }

    pub fn controller(&self) -> &ChatConnectionController<T, S> {
        &self.controller
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Apply a changed configuration.
    ///
    /// The participant name and server address are used by subsequent
    /// commands; the message limit takes effect immediately.
    pub fn reload_config(&mut self, config: ChatConfig) {
        info!(
            user_name = %config.user_name,
            server_uri = config.server_uri.as_deref().unwrap_or(""),
            message_limit = config.message_limit,
            "reloading chat configuration"
        );
        self.controller.set_message_limit(config.message_limit);
        self.controller
            .set_connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        self.config = config;
    }

    /// Decode and handle a raw `{cmd, name?, serverUri?, text?}` command.
    ///
    /// Unknown codes and malformed commands are logged and ignored.
    pub async fn dispatch_raw(&mut self, raw: RawCommand) -> Dispatch {
        self.hold_keep_alive();
        debug!(cmd = raw.cmd, "received command");

        match Command::try_from(raw) {
            Ok(command) => self.dispatch(command).await,
            Err(ChatError::UnknownCommand(code)) => {
                warn!(cmd = code, "ignoring unknown command");
                Dispatch::Continue
            }
            Err(err) => {
                warn!(error = %err, "ignoring malformed command");
                Dispatch::Continue
            }
        }
    }

    /// Handle a decoded command.
    pub async fn dispatch(&mut self, command: Command) -> Dispatch {
        self.hold_keep_alive();
        debug!(command = command.kind(), "dispatching command");

        match command {
            Command::Join { name, server_uri } => {
                let name = name.unwrap_or_else(|| self.config.user_name.clone());
                let server_uri = server_uri
                    .or_else(|| self.config.server_uri.clone())
                    .unwrap_or_default();

                if self.controller.is_connected() {
                    self.controller.disconnect().await;
                }
                if let Err(err) = self.controller.connect(&server_uri, &name).await {
                    warn!(error = %err, "join failed");
                }
                Dispatch::Continue
            }
            Command::Leave { name } => {
                let name = name.unwrap_or_else(|| self.config.user_name.clone());
                self.controller.leave(&name).await;
                Dispatch::Stop
            }
            Command::Send { name, text } => {
                let name = name.unwrap_or_else(|| self.config.user_name.clone());
                if let Err(err) = self.controller.send(&name, &text).await {
                    warn!(error = %err, "send failed");
                }
                Dispatch::Continue
            }
        }
    }

    /// Disconnect and give the keep-alive back.
    pub async fn shutdown(&mut self) {
        self.controller.disconnect().await;
        self.keep_alive_guard = None;
    }

    fn hold_keep_alive(&mut self) {
        if self.keep_alive_guard.is_none() {
            self.keep_alive_guard = Some(KeepAliveGuard::acquire(self.keep_alive.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingKeepAlive, FakeTransport, RecordingSink};
    use geochat_types::connection::ConnectionState;
    use geochat_types::event::ChatEvent;

    struct Harness {
        dispatcher: CommandDispatcher<FakeTransport, RecordingSink>,
        transport: FakeTransport,
        sink: RecordingSink,
        keep_alive: Arc<CountingKeepAlive>,
    }

    fn harness() -> Harness {
        let transport = FakeTransport::default();
        let sink = RecordingSink::default();
        let keep_alive = Arc::new(CountingKeepAlive::default());
        let config = ChatConfig {
            user_name: "alice".into(),
            server_uri: Some("ws://chat".into()),
            ..ChatConfig::default()
        };
        let dispatcher =
            CommandDispatcher::new(transport.clone(), sink.clone(), config, keep_alive.clone());
        Harness {
            dispatcher,
            transport,
            sink,
            keep_alive,
        }
    }

    fn raw(cmd: i32) -> RawCommand {
        RawCommand {
            cmd,
            ..Default::default()
        }
    }

    fn send(text: &str) -> RawCommand {
        RawCommand {
            cmd: 30,
            text: Some(text.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn join_uses_configured_name_and_server() {
        let mut h = harness();

        let outcome = h.dispatcher.dispatch_raw(raw(10)).await;

        assert_eq!(outcome, Dispatch::Continue);
        assert!(h.dispatcher.controller().is_connected());
        assert_eq!(
            h.transport.server().opened,
            vec![("ws://chat".to_string(), "alice".to_string())]
        );
    }

    #[tokio::test]
    async fn join_command_fields_override_config() {
        let mut h = harness();

        h.dispatcher
            .dispatch_raw(RawCommand {
                cmd: 10,
                name: Some("bob".into()),
                server_uri: Some("ws://elsewhere".into()),
                text: None,
            })
            .await;

        assert_eq!(
            h.transport.server().opened,
            vec![("ws://elsewhere".to_string(), "bob".to_string())]
        );
    }

    #[tokio::test]
    async fn join_while_connected_reconnects_once() {
        let mut h = harness();
        h.dispatcher.dispatch_raw(raw(10)).await;
        h.sink.clear();

        h.dispatcher.dispatch_raw(raw(10)).await;

        assert_eq!(h.sink.count("connection_closed"), 1);
        assert_eq!(h.transport.server().opened.len(), 2);
        assert!(h.dispatcher.controller().is_connected());
    }

    #[tokio::test]
    async fn join_without_server_address_keeps_running() {
        let mut h = harness();
        h.dispatcher.reload_config(ChatConfig::default());

        let outcome = h.dispatcher.dispatch_raw(raw(10)).await;

        assert_eq!(outcome, Dispatch::Continue);
        assert_eq!(h.dispatcher.controller().state(), ConnectionState::Disconnected);
        assert_eq!(h.sink.count("connection_failed"), 1);
    }

    #[tokio::test]
    async fn send_reaches_limit_and_closes_session() {
        let mut h = harness();
        h.dispatcher.dispatch_raw(raw(10)).await;

        h.dispatcher.dispatch_raw(send("hi")).await;
        assert!(h.dispatcher.controller().is_connected());

        h.dispatcher.dispatch_raw(send("bye")).await;
        assert!(!h.dispatcher.controller().is_connected());
        assert_eq!(h.sink.events().last(), Some(&ChatEvent::session_closed(2)));
        assert_eq!(
            h.transport.server().messages,
            vec![
                ("alice".to_string(), "hi".to_string()),
                ("alice".to_string(), "bye".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn send_while_disconnected_is_logged_not_surfaced() {
        let mut h = harness();

        let outcome = h.dispatcher.dispatch_raw(send("hi")).await;

        assert_eq!(outcome, Dispatch::Continue);
        assert!(h.transport.server().messages.is_empty());
        assert_eq!(h.dispatcher.controller().message_count(), 0);
    }

    #[tokio::test]
    async fn leave_disconnects_and_stops() {
        let mut h = harness();
        h.dispatcher.dispatch_raw(raw(10)).await;

        let outcome = h.dispatcher.dispatch_raw(raw(20)).await;

        assert_eq!(outcome, Dispatch::Stop);
        assert_eq!(h.transport.server().leaves, vec!["alice".to_string()]);
        assert_eq!(h.dispatcher.controller().state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn unknown_command_leaves_state_unchanged() {
        let mut h = harness();
        h.dispatcher.dispatch_raw(raw(10)).await;
        h.sink.clear();

        let outcome = h.dispatcher.dispatch_raw(raw(99)).await;

        assert_eq!(outcome, Dispatch::Continue);
        assert!(h.dispatcher.controller().is_connected());
        assert!(h.sink.events().is_empty());
    }

    #[tokio::test]
    async fn send_without_text_is_ignored() {
        let mut h = harness();
        h.dispatcher.dispatch_raw(raw(10)).await;

        let outcome = h.dispatcher.dispatch_raw(raw(30)).await;

        assert_eq!(outcome, Dispatch::Continue);
        assert_eq!(h.dispatcher.controller().message_count(), 0);
    }

    #[tokio::test]
    async fn reload_config_changes_limit_and_identity() {
        let mut h = harness();
        h.dispatcher.reload_config(ChatConfig {
            user_name: "carol".into(),
            server_uri: Some("ws://new".into()),
            message_limit: 3,
            connect_timeout_secs: 5,
        });

        h.dispatcher.dispatch_raw(raw(10)).await;
        for text in ["a", "b"] {
            h.dispatcher.dispatch_raw(send(text)).await;
        }
        assert!(h.dispatcher.controller().is_connected());
        h.dispatcher.dispatch_raw(send("c")).await;

        assert!(!h.dispatcher.controller().is_connected());
        assert_eq!(h.dispatcher.config().user_name, "carol");
        assert_eq!(
            h.transport.server().opened,
            vec![("ws://new".to_string(), "carol".to_string())]
        );
        assert_eq!(h.sink.events().last(), Some(&ChatEvent::session_closed(3)));
    }

    #[tokio::test]
    async fn keep_alive_acquired_once_and_released_on_drop() {
        let h = harness();
        let keep_alive = h.keep_alive.clone();
        let mut dispatcher = h.dispatcher;
        assert_eq!(keep_alive.acquired(), 0);

        dispatcher.dispatch_raw(raw(99)).await;
        dispatcher.dispatch_raw(raw(10)).await;
        dispatcher.dispatch_raw(send("hi")).await;
        assert_eq!(keep_alive.acquired(), 1);
        assert_eq!(keep_alive.released(), 0);

        drop(dispatcher);
        assert_eq!(keep_alive.released(), 1);
    }

    #[tokio::test]
    async fn shutdown_disconnects_and_releases() {
        let mut h = harness();
        h.dispatcher.dispatch_raw(raw(10)).await;

        h.dispatcher.shutdown().await;

        assert!(!h.dispatcher.controller().is_connected());
        assert_eq!(h.keep_alive.released(), 1);
        drop(h.dispatcher);
        assert_eq!(h.keep_alive.released(), 1);
    }
}
