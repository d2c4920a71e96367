//! Session descriptor returned by chat creation.

use super::permissions::FeaturePermissions;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields returned by the backend when a chat contact is started.
///
/// The participant token authenticates the transport connection, so it is
/// redacted from the `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartChatResult {
    pub participant_token: String,
    #[serde(alias = "WebSocketUrl", alias = "Url")]
    pub websocket_url: String,
    pub contact_id: String,
    #[serde(alias = "ParticipantId")]
    pub connection_id: String,
}

impl StartChatResult {
    pub fn new(
        participant_token: impl Into<String>,
        websocket_url: impl Into<String>,
        contact_id: impl Into<String>,
        connection_id: impl Into<String>,
    ) -> Self {
        Self {
            participant_token: participant_token.into(),
            websocket_url: websocket_url.into(),
            contact_id: contact_id.into(),
            connection_id: connection_id.into(),
        }
    }
}

impl fmt::Debug for StartChatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartChatResult")
            .field("participant_token", &"<redacted>")
            .field("websocket_url", &self.websocket_url)
            .field("contact_id", &self.contact_id)
            .field("connection_id", &self.connection_id)
            .finish()
    }
}

/// Everything needed to open a transport connection to one chat contact.
///
/// Produced once per initiation attempt (or supplied pre-built by the
/// caller) and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub start_chat_result: StartChatResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_permissions: Option<FeaturePermissions>,
}

impl SessionDescriptor {
    pub fn new(start_chat_result: StartChatResult) -> Self {
        Self {
            start_chat_result,
            feature_permissions: None,
        }
    }

    pub fn with_feature_permissions(mut self, permissions: FeaturePermissions) -> Self {
        self.feature_permissions = Some(permissions);
        self
    }

    pub fn contact_id(&self) -> &str {
        &self.start_chat_result.contact_id
    }

    pub fn connection_id(&self) -> &str {
        &self.start_chat_result.connection_id
    }

    pub fn websocket_url(&self) -> &str {
        &self.start_chat_result.websocket_url
    }

    pub fn participant_token(&self) -> &str {
        &self.start_chat_result.participant_token
    }
}
