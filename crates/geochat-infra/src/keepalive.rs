//! Log-backed keep-alive.
//!
//! A desktop host has no wake lock to hold, so `LogKeepAlive` tracks whether
//! the keep-alive is held and records each acquire/release in the log.

use std::sync::atomic::{AtomicBool, Ordering};

use geochat_core::keepalive::KeepAlive;

#[derive(Debug)]
pub struct LogKeepAlive {
    tag: String,
    held: AtomicBool,
}

impl LogKeepAlive {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            held: AtomicBool::new(false),
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

impl KeepAlive for LogKeepAlive {
    fn acquire(&self) {
        if self.held.swap(true, Ordering::SeqCst) {
            tracing::debug!(tag = %self.tag, "keep-alive already held");
        } else {
            tracing::info!(tag = %self.tag, "keep-alive acquired");
        }
    }

    fn release(&self) {
        if self.held.swap(false, Ordering::SeqCst) {
            tracing::info!(tag = %self.tag, "keep-alive released");
        }
    }
}
