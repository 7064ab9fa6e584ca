//! In-memory fakes shared by the controller and dispatcher tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use geochat_types::error::TransportError;
use geochat_types::event::ChatEvent;

use crate::event::EventSink;
use crate::keepalive::KeepAlive;
use crate::transport::{ChatConnection, ChatTransport};

/// Everything the fake server observed.
#[derive(Debug, Default)]
pub struct FakeServer {
    pub opened: Vec<(String, String)>,
    pub messages: Vec<(String, String)>,
    pub leaves: Vec<String>,
    pub closed: usize,
    pub fail_sends: bool,
    pub fail_leaves: bool,
    /// The server hung up; every write reports `Closed`.
    pub hung_up: bool,
}

/// Transport that accepts `ws://` addresses except `ws://unreachable`, and
/// never completes for `ws://hang`.
#[derive(Clone, Default)]
pub struct FakeTransport {
    pub server: Arc<Mutex<FakeServer>>,
}

impl FakeTransport {
    pub fn server(&self) -> std::sync::MutexGuard<'_, FakeServer> {
        self.server.lock().unwrap()
    }
}

pub struct FakeConnection {
    server: Arc<Mutex<FakeServer>>,
}

impl ChatTransport for FakeTransport {
    type Connection = FakeConnection;

    async fn open(&self, server_uri: &str, name: &str) -> Result<FakeConnection, TransportError> {
        match server_uri {
            "ws://hang" => std::future::pending().await,
            "ws://unreachable" => Err(TransportError::Unreachable("connection refused".into())),
            uri if !uri.starts_with("ws://") => Err(TransportError::InvalidAddress(uri.to_string())),
            uri => {
                self.server
                    .lock()
                    .unwrap()
                    .opened
                    .push((uri.to_string(), name.to_string()));
                Ok(FakeConnection {
                    server: self.server.clone(),
                })
            }
        }
    }
}

impl ChatConnection for FakeConnection {
    async fn send_message(&mut self, name: &str, text: &str) -> Result<(), TransportError> {
        let mut server = self.server.lock().unwrap();
        if server.hung_up {
            return Err(TransportError::Closed);
        }
        if server.fail_sends {
            return Err(TransportError::SendFailed("broken pipe".into()));
        }
        server.messages.push((name.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_leave(&mut self, name: &str) -> Result<(), TransportError> {
        let mut server = self.server.lock().unwrap();
        if server.fail_leaves {
            return Err(TransportError::Closed);
        }
        server.leaves.push(name.to_string());
        Ok(())
    }

    async fn close(self) -> Result<(), TransportError> {
        self.server.lock().unwrap().closed += 1;
        Ok(())
    }
}

/// Sink that keeps every event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<ChatEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ChatEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind)
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ChatEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct CountingKeepAlive {
    acquired: AtomicUsize,
    released: AtomicUsize,
}

impl CountingKeepAlive {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl KeepAlive for CountingKeepAlive {
    fn acquire(&self) {
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
