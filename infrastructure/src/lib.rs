//! Infrastructure layer for chatlink
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod backend;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use backend::{
    factory::HttpSessionDescriptorFactory,
    session::{WebSocketChatSession, WebSocketConnector},
};
pub use config::{
    ConfigLoader, ConfigValidationError, FileChatConfig, FileConfig, FileLoggingConfig,
    FileSessionConfig,
};
pub use logging::JsonlDiagnosticsLogger;
