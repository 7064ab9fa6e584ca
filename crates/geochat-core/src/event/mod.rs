//! Event delivery for controller-emitted `ChatEvent`s.
//!
//! `EventSink` is the port the controller emits through. `EventBus` is the
//! broadcast implementation that fans events out to every subscriber.

pub mod bus;
pub mod sink;

pub use bus::EventBus;
pub use sink::EventSink;
