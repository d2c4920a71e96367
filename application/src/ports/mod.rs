//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_session;
pub mod diagnostics_logger;
pub mod session_factory;
pub mod session_registry;
