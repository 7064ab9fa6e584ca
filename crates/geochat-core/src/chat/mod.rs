//! Chat connection management.
//!
//! - `session` -- `SessionManager` with per-session message counting
//! - `controller` -- `ChatConnectionController`, the connection state machine
//! - `dispatcher` -- `CommandDispatcher`, mapping inbound commands to the controller

pub mod controller;
pub mod dispatcher;
pub mod session;

pub use controller::ChatConnectionController;
pub use dispatcher::{CommandDispatcher, Dispatch};
pub use session::SessionManager;
