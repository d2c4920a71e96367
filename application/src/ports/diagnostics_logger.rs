//! Port for structured initiation diagnostics.
//!
//! Defines the [`DiagnosticsLogger`] trait for recording lifecycle events
//! (attempt started, succeeded, failed, superseded, reset) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures a
//! machine-readable record of every initiation attempt.

use serde_json::Value;

/// A structured diagnostics event.
pub struct DiagnosticsEvent {
    /// Event type identifier (e.g., "initiation_started", "session_reset").
    pub event_type: &'static str,
    /// JSON payload with event-specific data. Never contains auth tokens.
    pub payload: Value,
}

impl DiagnosticsEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging diagnostics events.
///
/// The `log` method is synchronous and non-fallible; logging failures
/// are silently ignored.
pub trait DiagnosticsLogger: Send + Sync {
    fn log(&self, event: DiagnosticsEvent);
}

/// No-op implementation for tests and when diagnostics are disabled.
pub struct NoDiagnosticsLogger;

impl DiagnosticsLogger for NoDiagnosticsLogger {
    fn log(&self, _event: DiagnosticsEvent) {}
}
