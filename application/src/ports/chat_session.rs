//! Chat session port
//!
//! A [`ChatSession`] owns the transport connection for one chat contact.
//! The orchestrator only relies on `open()` and `on_close()`; message
//! exchange is used by the presentation layer through the session registry.

use async_trait::async_trait;
use chatlink_domain::{InitiationInput, SessionDescriptor};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised while opening the transport connection
#[derive(Error, Debug)]
pub enum SessionOpenError {
    #[error("Invalid transport endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Handshake rejected: {0}")]
    Handshake(String),

    #[error("Session already opened")]
    AlreadyOpen,

    #[error("Connection closed before the chat started: {0:?}")]
    ClosedDuringOpen(CloseReason),
}

/// Errors raised when using an opened session
#[derive(Error, Debug)]
pub enum SessionIoError {
    #[error("Session is not open")]
    NotOpen,

    #[error("Session closed")]
    Closed,

    #[error("Send failed: {0}")]
    Send(String),
}

/// Why a session's connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// `close()` was called on this side.
    Local,
    /// The backend closed the connection.
    Remote { code: Option<u16>, reason: String },
    /// The connection dropped without a close handshake.
    Dropped(String),
}

/// Callback run when the session's connection terminates.
pub type CloseHandler = Box<dyn FnOnce(CloseReason) + Send>;

/// Raw text frames received from the backend. Ends when the connection does.
pub type IncomingMessages = mpsc::UnboundedReceiver<String>;

/// Identity-provider customization passed through to the session.
///
/// Absent values are carried as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomizationParams {
    pub auth_redirect_uri: String,
    pub auth_identity_provider: String,
}

/// Everything a connector needs to build a session.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub descriptor: SessionDescriptor,
    pub display_name: String,
    pub region: String,
    pub stage: String,
    pub customization: CustomizationParams,
}

impl SessionParams {
    pub fn from_input(descriptor: SessionDescriptor, input: &InitiationInput) -> Self {
        Self {
            descriptor,
            display_name: input.display_name.clone(),
            region: input.region.clone(),
            stage: input.stage.clone(),
            customization: CustomizationParams {
                auth_redirect_uri: input.redirect_uri.clone().unwrap_or_default(),
                auth_identity_provider: input.identity_provider.clone().unwrap_or_default(),
            },
        }
    }
}

/// A live (or about to be opened) chat transport.
#[async_trait]
pub trait ChatSession: Send + Sync {
    fn contact_id(&self) -> &str;

    fn connection_id(&self) -> &str;

    /// Register a handler run once when an established connection terminates
    /// for any reason (local close, remote close, network drop). A failed
    /// `open()` never runs close handlers. Registering after termination runs
    /// the handler immediately.
    fn on_close(&self, handler: CloseHandler);

    /// Resolves once the transport connection is established.
    async fn open(&self) -> Result<(), SessionOpenError>;

    /// Send a text message over the open connection.
    async fn send_message(&self, content: &str) -> Result<(), SessionIoError>;

    /// Close the connection; close handlers then run with [`CloseReason::Local`].
    async fn close(&self) -> Result<(), SessionIoError>;

    /// Hand out the receiver of incoming frames. Only the first call after
    /// `open()` returns `Some`.
    fn incoming(&self) -> Option<IncomingMessages> {
        None
    }
}

/// Builds sessions from descriptors. Construction itself never fails.
pub trait ChatSessionConnector: Send + Sync {
    fn connect(&self, params: SessionParams) -> Arc<dyn ChatSession>;
}
