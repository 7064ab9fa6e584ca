//! Chat transport implementations.

pub mod ws;

pub use ws::{WsConnection, WsTransport};
