//! Scoped keep-alive resource.
//!
//! The host keeps a resource (a wake-lock equivalent) while it is serving
//! commands. `KeepAliveGuard` acquires it on creation and releases it on drop,
//! so every exit path, unwinding included, gives it back.

use std::sync::Arc;

/// A resource that keeps the hosting process active.
pub trait KeepAlive: Send + Sync {
    fn acquire(&self);
    fn release(&self);
}

/// RAII handle over an acquired `KeepAlive`.
pub struct KeepAliveGuard {
    inner: Arc<dyn KeepAlive>,
}

impl KeepAliveGuard {
    /// Acquire `keep_alive` and hold it until the guard is dropped.
    pub fn acquire(keep_alive: Arc<dyn KeepAlive>) -> Self {
        tracing::debug!("acquiring keep-alive");
        keep_alive.acquire();
        Self { inner: keep_alive }
    }
}

impl Drop for KeepAliveGuard {
    fn drop(&mut self) {
        tracing::debug!("releasing keep-alive");
        self.inner.release();
    }
}

impl std::fmt::Debug for KeepAliveGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeepAliveGuard").finish_non_exhaustive()
    }
}
