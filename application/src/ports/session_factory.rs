//! Session descriptor factory port
//!
//! Defines how the application layer asks the backend to create a chat
//! contact. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use chatlink_domain::{DomainError, InitiationInput, SessionDescriptor};
use thiserror::Error;

/// Errors that can occur while creating a session descriptor
#[derive(Error, Debug)]
pub enum DescriptorCreationError {
    #[error("Invalid initiation input: {0}")]
    Validation(#[from] DomainError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Chat creation rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed chat creation response: {0}")]
    MalformedResponse(String),

    #[error("No chat creation endpoint configured")]
    MissingEndpoint,
}

/// Creates the descriptor needed to open a chat session.
///
/// A failed call must not return a partially populated descriptor.
#[async_trait]
pub trait SessionDescriptorFactory: Send + Sync {
    async fn create(
        &self,
        input: &InitiationInput,
    ) -> Result<SessionDescriptor, DescriptorCreationError>;
}
