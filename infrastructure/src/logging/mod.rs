//! Logging infrastructure - structured initiation diagnostics.
//!
//! Provides [`JsonlDiagnosticsLogger`], a JSONL file writer that implements
//! the [`DiagnosticsLogger`](chatlink_application::DiagnosticsLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlDiagnosticsLogger;
