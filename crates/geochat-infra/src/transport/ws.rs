//! WebSocket chat transport.
//!
//! Speaks a small JSON protocol over text frames:
//!
//! ```text
//! client -> server  {"type":"join","name":"alice"}
//! client -> server  {"type":"message","name":"alice","text":"hi"}
//! client -> server  {"type":"leave","name":"alice"}
//! server -> client  {"type":"message","name":"bob","text":"hello"}
//! ```
//!
//! Inbound chat messages are forwarded to the event sink as
//! `ChatEvent::NewMessage` by a reader task owned by the connection.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use geochat_core::event::EventSink;
use geochat_core::transport::{ChatConnection, ChatTransport};
use geochat_types::error::TransportError;
use geochat_types::event::ChatEvent;
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::error::{Error as WsError, ProtocolError};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A frame of the chat wire protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Join { name: String },
    Message { name: String, text: String },
    Leave { name: String },
}

impl Frame {
    fn into_message(self) -> Result<Message, TransportError> {
        let json = serde_json::to_string(&self)
            .map_err(|e| TransportError::SendFailed(format!("frame encoding failed: {e}")))?;
        Ok(Message::Text(json))
    }
}

/// Check that `server_uri` is a WebSocket address.
pub fn validate_server_uri(server_uri: &str) -> Result<(), TransportError> {
    let uri = server_uri.trim();
    let rest = uri
        .strip_prefix("ws://")
        .or_else(|| uri.strip_prefix("wss://"))
        .ok_or_else(|| TransportError::InvalidAddress(uri.to_string()))?;
    if rest.is_empty() || rest.starts_with('/') {
        return Err(TransportError::InvalidAddress(uri.to_string()));
    }
    Ok(())
}

/// `ChatTransport` over WebSocket.
///
/// `sink` receives the messages other participants post while a connection
/// opened by this transport is alive.
#[derive(Clone)]
pub struct WsTransport<S> {
    sink: S,
}

impl<S: EventSink + Clone + 'static> WsTransport<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<S: EventSink + Clone + 'static> ChatTransport for WsTransport<S> {
    type Connection = WsConnection;

    async fn open(&self, server_uri: &str, name: &str) -> Result<WsConnection, TransportError> {
        validate_server_uri(server_uri)?;

        let (stream, _response) = connect_async(server_uri.trim())
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;
        let (mut writer, reader) = stream.split();

        writer
            .send(
                Frame::Join {
                    name: name.to_string(),
                }
                .into_message()?,
            )
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        let reader_task = tokio::spawn(forward_inbound(reader, self.sink.clone()));
        info!(%server_uri, %name, "websocket connection open");

        Ok(WsConnection {
            writer,
            reader_task,
        })
    }
}

/// One open WebSocket chat connection.
pub struct WsConnection {
    writer: SplitSink<WsStream, Message>,
    reader_task: JoinHandle<()>,
}

impl WsConnection {
    async fn send_frame(&mut self, frame: Frame) -> Result<(), TransportError> {
        if self.reader_task.is_finished() {
            return Err(TransportError::Closed);
        }
        self.writer.send(frame.into_message()?).await.map_err(write_error)
    }
}

/// Map a WebSocket write failure, reporting a peer hang-up as `Closed`.
fn write_error(err: WsError) -> TransportError {
    match err {
        WsError::ConnectionClosed
        | WsError::AlreadyClosed
        | WsError::Protocol(ProtocolError::SendAfterClosing) => TransportError::Closed,
        WsError::Io(io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset
            ) =>
        {
            TransportError::Closed
        }
        other => TransportError::SendFailed(other.to_string()),
    }
}

impl ChatConnection for WsConnection {
    async fn send_message(&mut self, name: &str, text: &str) -> Result<(), TransportError> {
        self.send_frame(Frame::Message {
            name: name.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_leave(&mut self, name: &str) -> Result<(), TransportError> {
        self.send_frame(Frame::Leave {
            name: name.to_string(),
        })
        .await
    }

    async fn close(mut self) -> Result<(), TransportError> {
        let result = match self.writer.send(Message::Close(None)).await.map_err(write_error) {
            // Already gone from the server side; nothing left to tear down.
            Err(TransportError::Closed) => Ok(()),
            other => other,
        };
        let _ = self.writer.close().await;
        self.reader_task.abort();
        result
    }
}

impl Drop for WsConnection {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}

async fn forward_inbound<S: EventSink>(mut reader: SplitStream<WsStream>, sink: S) {
    while let Some(message) = reader.next().await {
        match message {
            Ok(Message::Text(payload)) => match serde_json::from_str::<Frame>(&payload) {
                Ok(Frame::Message { name, text }) => {
                    sink.emit(ChatEvent::NewMessage {
                        text: format!("{name}: {text}"),
                    });
                }
                Ok(other) => debug!(frame = ?other, "ignoring server frame"),
                Err(err) => warn!(error = %err, "unparseable server frame"),
            },
            Ok(Message::Close(_)) => {
                info!("server closed the chat connection");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, "websocket read failed");
                break;
            }
        }
    }
}
