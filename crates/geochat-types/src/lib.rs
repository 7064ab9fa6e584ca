//! Shared domain types for GeoChat.
//!
//! This crate contains the types passed between the connection controller,
//! the command dispatcher and the event consumers: connection state, session
//! snapshots, inbound commands, outbound events, configuration and errors.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod event;
pub mod message;
pub mod session;
