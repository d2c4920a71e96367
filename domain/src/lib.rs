//! Domain layer for chatlink
//!
//! This crate contains the entities and value objects involved in starting
//! a real-time chat with a contact-center backend.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Initiation
//!
//! A chat is started in two phases:
//!
//! - **Descriptor acquisition**: the backend creates the chat contact and
//!   returns a [`SessionDescriptor`] (token, endpoint, identifiers)
//! - **Session opening**: a transport connection is opened against that descriptor
//!
//! ## Lifecycle
//!
//! Observers see exactly one [`LifecycleState`] at a time:
//! `NotInitiated → Initiating → Initiated | InitiateFailed → NotInitiated`.

pub mod composer;
pub mod core;
pub mod initiation;
pub mod lifecycle;

// Re-export commonly used types
pub use composer::{ATTACHMENTS_PERMISSION, ComposerConfig, MARKDOWN_CONTENT_TYPE};
pub use core::error::DomainError;
pub use initiation::{
    descriptor::{SessionDescriptor, StartChatResult},
    input::InitiationInput,
    permissions::FeaturePermissions,
};
pub use lifecycle::{language::Language, state::LifecycleState};
