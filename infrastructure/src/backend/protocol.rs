//! Wire types for the chat backend.
//!
//! - **Chat creation**: client → API gateway (`StartChatRequest`), answered
//!   with a JSON envelope carrying `startChatResult` and optional
//!   `featurePermissions`.
//! - **Transport**: JSON text frames over the WebSocket (`OutgoingMessage`).

use chatlink_application::DescriptorCreationError;
use chatlink_domain::{
    FeaturePermissions, InitiationInput, Language, SessionDescriptor, StartChatResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Body POSTed to the API gateway to create a chat contact.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StartChatRequest<'a> {
    pub contact_flow_id: &'a str,
    pub instance_id: &'a str,
    pub participant_details: ParticipantDetails<'a>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supported_messaging_content_types: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_permissions: Option<&'a FeaturePermissions>,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub region: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    pub stage: &'a str,
    pub language: Language,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParticipantDetails<'a> {
    pub display_name: &'a str,
}

impl<'a> StartChatRequest<'a> {
    pub fn from_input(input: &'a InitiationInput) -> Self {
        Self {
            contact_flow_id: &input.contact_flow_id,
            instance_id: &input.instance_id,
            participant_details: ParticipantDetails {
                display_name: &input.display_name,
            },
            supported_messaging_content_types: input.content_types(),
            feature_permissions: (!input.feature_permissions.is_empty())
                .then_some(&input.feature_permissions),
            region: &input.region,
            stage: &input.stage,
            language: Language::or_default(input.language.as_deref()),
            attributes: &input.contact_attributes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartChatPayload {
    start_chat_result: Option<Value>,
    feature_permissions: Option<FeaturePermissions>,
}

#[derive(Debug, Deserialize)]
struct StartChatEnvelope {
    data: Option<StartChatPayload>,
    #[serde(flatten)]
    top_level: StartChatPayload,
}

/// Parse a chat creation response body into a descriptor.
///
/// Accepts `{ "data": { "startChatResult": .. } }` as well as a top-level
/// `startChatResult`. Nothing partial is returned: a missing participant
/// token or WebSocket URL fails the whole parse.
pub fn parse_start_chat_response(body: &str) -> Result<SessionDescriptor, DescriptorCreationError> {
    let envelope: StartChatEnvelope = serde_json::from_str(body)
        .map_err(|e| DescriptorCreationError::MalformedResponse(e.to_string()))?;

    let payload = match envelope.data {
        Some(data) if data.start_chat_result.is_some() => data,
        _ => envelope.top_level,
    };

    let raw = payload.start_chat_result.ok_or_else(|| {
        DescriptorCreationError::MalformedResponse("missing startChatResult".to_string())
    })?;
    let result: StartChatResult = serde_json::from_value(raw)
        .map_err(|e| DescriptorCreationError::MalformedResponse(e.to_string()))?;

    if result.participant_token.trim().is_empty() {
        return Err(DescriptorCreationError::MalformedResponse(
            "empty participant token".to_string(),
        ));
    }
    if result.websocket_url.trim().is_empty() {
        return Err(DescriptorCreationError::MalformedResponse(
            "empty websocket url".to_string(),
        ));
    }

    let descriptor = SessionDescriptor::new(result);
    Ok(match payload.feature_permissions {
        Some(permissions) => descriptor.with_feature_permissions(permissions),
        None => descriptor,
    })
}

/// Text frame sent by the participant.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage<'a> {
    pub topic: &'static str,
    pub content_type: &'static str,
    pub content: &'a str,
}

impl<'a> OutgoingMessage<'a> {
    pub fn text(content: &'a str) -> Self {
        Self {
            topic: "send_message",
            content_type: "text/plain",
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let input = InitiationInput::new("cf-1", "inst-1")
            .with_display_name("Jane")
            .with_region("us-west-2")
            .with_supported_messaging_content_types("text/plain, text/markdown")
            .with_feature_permissions(FeaturePermissions::new().with("ATTACHMENTS", true));

        let body = serde_json::to_value(StartChatRequest::from_input(&input)).unwrap();

        assert_eq!(body["ContactFlowId"], "cf-1");
        assert_eq!(body["InstanceId"], "inst-1");
        assert_eq!(body["ParticipantDetails"]["DisplayName"], "Jane");
        assert_eq!(
            body["SupportedMessagingContentTypes"],
            json!(["text/plain", "text/markdown"])
        );
        assert_eq!(body["FeaturePermissions"]["ATTACHMENTS"], true);
        assert_eq!(body["Region"], "us-west-2");
        assert_eq!(body["Language"], "en_US");
        assert!(body.get("Stage").is_none());
        assert!(body.get("Attributes").is_none());
    }

    #[test]
    fn test_request_carries_language_and_attributes() {
        let input = InitiationInput::new("cf-1", "inst-1")
            .with_language("fr_FR")
            .with_contact_attribute("tier", "gold");

        let body = serde_json::to_value(StartChatRequest::from_input(&input)).unwrap();

        assert_eq!(body["Language"], "fr_FR");
        assert_eq!(body["Attributes"]["tier"], "gold");
        assert!(body.get("SupportedMessagingContentTypes").is_none());
        assert!(body.get("FeaturePermissions").is_none());
    }

    #[test]
    fn test_parse_data_envelope() {
        let body = json!({
            "data": {
                "startChatResult": {
                    "ContactId": "c-1",
                    "ParticipantId": "p-1",
                    "ParticipantToken": "tok",
                    "WebsocketUrl": "wss://chat.example.com/c-1"
                },
                "featurePermissions": { "ATTACHMENTS": "true" }
            }
        })
        .to_string();

        let descriptor = parse_start_chat_response(&body).unwrap();

        assert_eq!(descriptor.contact_id(), "c-1");
        assert_eq!(descriptor.connection_id(), "p-1");
        assert_eq!(descriptor.websocket_url(), "wss://chat.example.com/c-1");
        assert!(
            descriptor
                .feature_permissions
                .as_ref()
                .unwrap()
                .is_enabled("ATTACHMENTS")
        );
    }

    #[test]
    fn test_parse_top_level_result() {
        let body = json!({
            "startChatResult": {
                "ContactId": "c-2",
                "ConnectionId": "conn-2",
                "ParticipantToken": "tok",
                "WebsocketUrl": "wss://chat.example.com/c-2"
            }
        })
        .to_string();

        let descriptor = parse_start_chat_response(&body).unwrap();
        assert_eq!(descriptor.contact_id(), "c-2");
        assert!(descriptor.feature_permissions.is_none());
    }

    #[test]
    fn test_parse_missing_token_is_malformed() {
        let body = json!({
            "data": {
                "startChatResult": {
                    "ContactId": "c-1",
                    "ParticipantId": "p-1",
                    "WebsocketUrl": "wss://chat.example.com/c-1"
                }
            }
        })
        .to_string();

        assert!(matches!(
            parse_start_chat_response(&body),
            Err(DescriptorCreationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_empty_websocket_url_is_malformed() {
        let body = json!({
            "startChatResult": {
                "ContactId": "c-1",
                "ParticipantId": "p-1",
                "ParticipantToken": "tok",
                "WebsocketUrl": ""
            }
        })
        .to_string();

        assert!(matches!(
            parse_start_chat_response(&body),
            Err(DescriptorCreationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_non_json_is_malformed() {
        assert!(matches!(
            parse_start_chat_response("<html>bad gateway</html>"),
            Err(DescriptorCreationError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_start_chat_response("{}"),
            Err(DescriptorCreationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_outgoing_message_frame() {
        let frame = serde_json::to_value(OutgoingMessage::text("hello")).unwrap();
        assert_eq!(
            frame,
            json!({ "topic": "send_message", "contentType": "text/plain", "content": "hello" })
        );
    }
}
