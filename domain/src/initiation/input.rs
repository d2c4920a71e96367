//! Caller-supplied initiation input

use super::descriptor::SessionDescriptor;
use super::permissions::FeaturePermissions;
use crate::core::error::DomainError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Everything a caller provides to start a chat.
///
/// When [`chat_session_parameters`](Self::chat_session_parameters) is set the
/// remote creation call is skipped and those parameters are used as the
/// descriptor directly; otherwise the descriptor factory must be called.
///
/// # Examples
///
/// ```
/// use chatlink_domain::InitiationInput;
///
/// let input = InitiationInput::new("cf1", "i1")
///     .with_display_name("Jane")
///     .with_language("fr_FR");
///
/// assert!(input.requires_factory());
/// assert_eq!(input.language.as_deref(), Some("fr_FR"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitiationInput {
    pub contact_flow_id: String,
    pub instance_id: String,
    pub region: String,
    pub stage: String,
    pub feature_permissions: FeaturePermissions,
    pub api_gateway_endpoint: Option<String>,
    #[serde(alias = "name")]
    pub display_name: String,
    pub redirect_uri: Option<String>,
    pub identity_provider: Option<String>,
    pub language: Option<String>,
    /// Comma-separated content types. A non-string JSON value is read as absent.
    #[serde(deserialize_with = "string_or_none")]
    pub supported_messaging_content_types: Option<String>,
    /// Extra key/value attributes forwarded to the contact flow.
    pub contact_attributes: BTreeMap<String, String>,
    pub chat_session_parameters: Option<SessionDescriptor>,
}

impl InitiationInput {
    pub fn new(contact_flow_id: impl Into<String>, instance_id: impl Into<String>) -> Self {
        Self {
            contact_flow_id: contact_flow_id.into(),
            instance_id: instance_id.into(),
            ..Self::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_api_gateway_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_gateway_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_feature_permissions(mut self, permissions: FeaturePermissions) -> Self {
        self.feature_permissions = permissions;
        self
    }

    pub fn with_supported_messaging_content_types(mut self, types: impl Into<String>) -> Self {
        self.supported_messaging_content_types = Some(types.into());
        self
    }

    pub fn with_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    pub fn with_identity_provider(mut self, provider: impl Into<String>) -> Self {
        self.identity_provider = Some(provider.into());
        self
    }

    pub fn with_contact_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.contact_attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_chat_session_parameters(mut self, descriptor: SessionDescriptor) -> Self {
        self.chat_session_parameters = Some(descriptor);
        self
    }

    /// `true` when no pre-built session parameters were supplied.
    pub fn requires_factory(&self) -> bool {
        self.chat_session_parameters.is_none()
    }

    /// Checks the fields a remote chat creation needs.
    ///
    /// Pre-built session parameters make every field optional.
    pub fn validate_for_creation(&self) -> Result<(), DomainError> {
        if !self.requires_factory() {
            return Ok(());
        }
        if self.contact_flow_id.trim().is_empty() {
            return Err(DomainError::MissingField("contact_flow_id"));
        }
        if self.instance_id.trim().is_empty() {
            return Err(DomainError::MissingField("instance_id"));
        }
        Ok(())
    }

    /// Content types split on commas, trimmed, empties dropped.
    pub fn content_types(&self) -> Vec<&str> {
        self.supported_messaging_content_types
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
