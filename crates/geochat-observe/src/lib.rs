//! Observability setup for GeoChat: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
