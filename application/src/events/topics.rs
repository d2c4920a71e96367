//! Chat lifecycle topics.

use super::bus::Topic;
use crate::use_cases::initiate_chat::InitiationCallbacks;
use chatlink_domain::InitiationInput;

/// Request to start a chat; consumed by the initiation orchestrator.
#[derive(Debug, Clone)]
pub struct InitChatRequest {
    pub input: InitiationInput,
    pub callbacks: InitiationCallbacks,
}

impl InitChatRequest {
    pub fn new(input: InitiationInput) -> Self {
        Self {
            input,
            callbacks: InitiationCallbacks::none(),
        }
    }

    pub fn with_callbacks(mut self, callbacks: InitiationCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

/// `initChat`: somebody wants a chat started.
pub struct InitChat;

impl Topic for InitChat {
    type Payload = InitChatRequest;
    const NAME: &'static str = "initChat";
}

/// `endChat`: the active chat session has ended. No payload.
pub struct EndChat;

impl Topic for EndChat {
    type Payload = ();
    const NAME: &'static str = "endChat";
}
