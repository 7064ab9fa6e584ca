use std::sync::Arc;

use geochat_types::event::ChatEvent;

/// Consumer of controller-emitted events.
///
/// Implementations forward events to presentation, notification or storage
/// layers. `emit` must not block; slow consumers should buffer internally.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ChatEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: ChatEvent) {
        (**self).emit(event)
    }
}

impl<S: EventSink + ?Sized> EventSink for &S {
    fn emit(&self, event: ChatEvent) {
        (**self).emit(event)
    }
}
