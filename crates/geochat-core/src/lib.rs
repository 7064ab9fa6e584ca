//! Business logic and port trait definitions for GeoChat.
//!
//! This crate defines the "ports" (transport, event sink, keep-alive) that the
//! infrastructure layer implements, plus the connection controller and the
//! command dispatcher built on top of them. It depends only on
//! `geochat-types` -- never on `geochat-infra` or any network/IO crate.

pub mod chat;
pub mod event;
pub mod keepalive;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
