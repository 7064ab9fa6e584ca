//! SQLite persistence for the chat history.

pub mod message;
pub mod pool;

pub use message::{SqliteMessageStore, spawn_recorder};
pub use pool::DatabasePool;
