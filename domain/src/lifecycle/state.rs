//! Lifecycle state of the chat initiation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single authoritative lifecycle state shown to observers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    NotInitiated,
    Initiating,
    Initiated,
    InitiateFailed,
}

impl LifecycleState {
    /// Terminal states only leave through `reset()`, an `endChat` event, or a
    /// new initiation attempt.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Initiated | Self::InitiateFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitiated => "NotInitiated",
            Self::Initiating => "Initiating",
            Self::Initiated => "Initiated",
            Self::InitiateFailed => "InitiateFailed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
