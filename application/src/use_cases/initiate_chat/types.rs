//! Initiation result, error and callback types.

use crate::ports::chat_session::{ChatSession, SessionOpenError};
use crate::ports::session_factory::DescriptorCreationError;
use chatlink_domain::{ComposerConfig, Language, LifecycleState};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Why an initiation attempt failed.
///
/// Both variants are terminal for the attempt; there is no retry at this layer.
#[derive(Error, Debug)]
pub enum InitiationError {
    #[error("Chat creation failed: {0}")]
    DescriptorCreation(#[from] DescriptorCreationError),

    #[error("Chat connection failed: {0}")]
    SessionOpen(#[from] SessionOpenError),
}

impl InitiationError {
    /// Which phase failed, for diagnostics.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::DescriptorCreation(_) => "descriptor_creation",
            Self::SessionOpen(_) => "session_open",
        }
    }
}

/// Result of one initiation attempt.
pub enum InitiationOutcome {
    /// Both phases succeeded; the session is now current.
    Initiated(Arc<dyn ChatSession>),
    /// Either phase failed; state is `InitiateFailed`.
    Failed(InitiationError),
    /// A newer attempt (or a reset) took over before this one finished.
    /// Nothing was published and no callback ran.
    Superseded,
}

impl InitiationOutcome {
    pub fn is_initiated(&self) -> bool {
        matches!(self, Self::Initiated(_))
    }

    pub fn session(&self) -> Option<&Arc<dyn ChatSession>> {
        match self {
            Self::Initiated(session) => Some(session),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&InitiationError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Debug for InitiationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiated(session) => f
                .debug_tuple("Initiated")
                .field(&session.contact_id())
                .finish(),
            Self::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            Self::Superseded => f.write_str("Superseded"),
        }
    }
}

pub type SuccessCallback = Arc<dyn Fn(Arc<dyn ChatSession>) + Send + Sync>;
pub type FailureCallback = Arc<dyn Fn(&InitiationError) + Send + Sync>;

/// Optional success/failure callbacks, adapted from an [`InitiationOutcome`].
#[derive(Clone, Default)]
pub struct InitiationCallbacks {
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl InitiationCallbacks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl Fn(Arc<dyn ChatSession>) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(f));
        self
    }

    pub fn on_failure(mut self, f: impl Fn(&InitiationError) + Send + Sync + 'static) -> Self {
        self.on_failure = Some(Arc::new(f));
        self
    }

    /// Invoke the callback matching `outcome`, if any.
    pub fn dispatch(&self, outcome: &InitiationOutcome) {
        match outcome {
            InitiationOutcome::Initiated(session) => {
                if let Some(cb) = &self.on_success {
                    cb(Arc::clone(session));
                }
            }
            InitiationOutcome::Failed(error) => {
                if let Some(cb) = &self.on_failure {
                    cb(error);
                }
            }
            InitiationOutcome::Superseded => {}
        }
    }
}

impl fmt::Debug for InitiationCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitiationCallbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Read-only view of the orchestrator for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSnapshot {
    pub state: LifecycleState,
    /// Set only while `Initiated`.
    pub composer: Option<ComposerConfig>,
    pub language: Language,
    /// Number of the latest attempt (0 before the first one).
    pub attempt: u64,
    pub contact_id: Option<String>,
}

impl Default for LifecycleSnapshot {
    fn default() -> Self {
        Self {
            state: LifecycleState::NotInitiated,
            composer: None,
            language: Language::default(),
            attempt: 0,
            contact_id: None,
        }
    }
}
