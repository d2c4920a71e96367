//! Application layer for chatlink
//!
//! This crate contains the initiation orchestrator, port definitions,
//! the in-process event bus, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod events;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::OrchestratorParams;
pub use events::{EndChat, EventBus, InitChat, InitChatRequest, SubscriptionId, Topic};
pub use ports::{
    chat_session::{
        ChatSession, ChatSessionConnector, CloseHandler, CloseReason, CustomizationParams,
        IncomingMessages, SessionIoError, SessionOpenError, SessionParams,
    },
    diagnostics_logger::{DiagnosticsEvent, DiagnosticsLogger, NoDiagnosticsLogger},
    session_factory::{DescriptorCreationError, SessionDescriptorFactory},
    session_registry::{InMemorySessionRegistry, SessionRegistry, same_session},
};
pub use use_cases::initiate_chat::{
    InitiationCallbacks, InitiationError, InitiationOrchestrator, InitiationOrchestratorBuilder,
    InitiationOutcome, LifecycleSnapshot,
};
