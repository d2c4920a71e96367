//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain/application
//! types by the `to_*` helpers.

use chatlink_application::OrchestratorParams;
use chatlink_domain::{FeaturePermissions, InitiationInput, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("connect_timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("contact_flow_id cannot be empty")]
    EmptyContactFlowId,

    #[error("instance_id cannot be empty")]
    EmptyInstanceId,

    #[error("api_gateway_endpoint is required unless session_parameters_file is set")]
    MissingEndpoint,

    #[error("invalid language tag: {0}")]
    InvalidLanguage(String),
}

/// Raw `[chat]` section: what to send when creating a chat.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    pub contact_flow_id: String,
    pub instance_id: String,
    pub region: String,
    pub stage: String,
    /// Chat creation endpoint (API gateway URL)
    pub api_gateway_endpoint: Option<String>,
    pub display_name: String,
    pub language: Option<String>,
    /// Comma-separated, e.g. `"text/plain,text/markdown"`
    pub supported_messaging_content_types: Option<String>,
    pub redirect_uri: Option<String>,
    pub identity_provider: Option<String>,
    /// Capability flags, e.g. `ATTACHMENTS = true`
    pub feature_permissions: BTreeMap<String, bool>,
    pub contact_attributes: BTreeMap<String, String>,
    /// JSON file holding pre-built session parameters; skips chat creation.
    pub session_parameters_file: Option<PathBuf>,
}

impl FileChatConfig {
    /// Build the initiation input. Pre-built session parameters are loaded
    /// separately by the caller.
    pub fn to_initiation_input(&self) -> InitiationInput {
        let mut input = InitiationInput::new(&self.contact_flow_id, &self.instance_id)
            .with_region(&self.region)
            .with_stage(&self.stage)
            .with_display_name(&self.display_name)
            .with_feature_permissions(
                self.feature_permissions
                    .iter()
                    .map(|(k, v)| (k.clone(), *v))
                    .collect::<FeaturePermissions>(),
            );
        input.api_gateway_endpoint = self.api_gateway_endpoint.clone();
        input.language = self.language.clone();
        input.supported_messaging_content_types = self.supported_messaging_content_types.clone();
        input.redirect_uri = self.redirect_uri.clone();
        input.identity_provider = self.identity_provider.clone();
        input.contact_attributes = self.contact_attributes.clone();
        input
    }
}

/// Raw `[session]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Upper bound on a whole initiation (creation + connect), in seconds
    pub connect_timeout_seconds: u64,
    /// Language used when `[chat].language` is unset
    pub default_language: Option<String>,
    pub close_superseded_sessions: bool,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_seconds: 30,
            default_language: None,
            close_superseded_sessions: true,
        }
    }
}

impl FileSessionConfig {
    pub fn to_orchestrator_params(&self) -> OrchestratorParams {
        OrchestratorParams::default()
            .with_default_language(Language::or_default(self.default_language.as_deref()))
            .with_close_superseded_sessions(self.close_superseded_sessions)
    }
}

/// Raw `[logging]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving initiation diagnostics
    pub diagnostics_file: Option<PathBuf>,
    /// Directory for daily-rotated tracing logs
    pub log_dir: Option<PathBuf>,
}

/// Complete file configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub chat: FileChatConfig,
    pub session: FileSessionConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.session.connect_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        for tag in [&self.chat.language, &self.session.default_language]
            .into_iter()
            .flatten()
        {
            if tag.parse::<Language>().is_err() {
                return Err(ConfigValidationError::InvalidLanguage(tag.clone()));
            }
        }

        // Pre-built parameters make the creation fields irrelevant
        if self.chat.session_parameters_file.is_some() {
            return Ok(());
        }

        if self.chat.contact_flow_id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyContactFlowId);
        }
        if self.chat.instance_id.trim().is_empty() {
            return Err(ConfigValidationError::EmptyInstanceId);
        }
        if self
            .chat
            .api_gateway_endpoint
            .as_deref()
            .is_none_or(|e| e.trim().is_empty())
        {
            return Err(ConfigValidationError::MissingEndpoint);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_toml() -> &'static str {
        r#"
[chat]
contact_flow_id = "cf-1"
instance_id = "inst-1"
region = "us-west-2"
api_gateway_endpoint = "https://gw.example.com/prod"
display_name = "Jane"
"#
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[chat]
contact_flow_id = "cf-1"
instance_id = "inst-1"
region = "eu-central-1"
stage = "prod"
api_gateway_endpoint = "https://gw.example.com/prod"
display_name = "Jane"
language = "fr_FR"
supported_messaging_content_types = "text/plain,text/markdown"
redirect_uri = "https://app.example.com/cb"
identity_provider = "Google"

[chat.feature_permissions]
ATTACHMENTS = true

[chat.contact_attributes]
customerTier = "gold"

[session]
connect_timeout_seconds = 10
default_language = "de_DE"
close_superseded_sessions = false

[logging]
diagnostics_file = "/tmp/chatlink.jsonl"
log_dir = "/tmp/chatlink-logs"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chat.contact_flow_id, "cf-1");
        assert_eq!(config.chat.stage, "prod");
        assert_eq!(config.chat.feature_permissions.get("ATTACHMENTS"), Some(&true));
        assert_eq!(config.session.connect_timeout_seconds, 10);
        assert!(!config.session.close_superseded_sessions);
        assert_eq!(
            config.logging.diagnostics_file,
            Some(PathBuf::from("/tmp/chatlink.jsonl"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str(valid_toml()).unwrap();
        assert_eq!(config.chat.instance_id, "inst-1");
        // Defaults should apply
        assert_eq!(config.session.connect_timeout_seconds, 30);
        assert!(config.session.close_superseded_sessions);
        assert!(config.logging.diagnostics_file.is_none());
    }

    #[test]
    fn test_default_config_needs_chat_section() {
        let config = FileConfig::default();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyContactFlowId)
        );
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config: FileConfig = toml::from_str(valid_toml()).unwrap();
        config.session.connect_timeout_seconds = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidTimeout));
    }

    #[test]
    fn test_validate_missing_endpoint() {
        let mut config: FileConfig = toml::from_str(valid_toml()).unwrap();
        config.chat.api_gateway_endpoint = Some("  ".to_string());
        assert_eq!(config.validate(), Err(ConfigValidationError::MissingEndpoint));

        config.chat.api_gateway_endpoint = None;
        assert_eq!(config.validate(), Err(ConfigValidationError::MissingEndpoint));
    }

    #[test]
    fn test_validate_empty_instance_id() {
        let mut config: FileConfig = toml::from_str(valid_toml()).unwrap();
        config.chat.instance_id.clear();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyInstanceId));
    }

    #[test]
    fn test_validate_session_parameters_file_skips_creation_fields() {
        let mut config = FileConfig::default();
        config.chat.session_parameters_file = Some(PathBuf::from("session.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_language() {
        let mut config: FileConfig = toml::from_str(valid_toml()).unwrap();
        config.chat.language = Some("fr FR".to_string());
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidLanguage("fr FR".to_string()))
        );
    }

    #[test]
    fn test_to_initiation_input() {
        let toml_str = r#"
[chat]
contact_flow_id = "cf-1"
instance_id = "inst-1"
api_gateway_endpoint = "https://gw.example.com/prod"
display_name = "Jane"
supported_messaging_content_types = "text/plain,text/markdown"

[chat.feature_permissions]
ATTACHMENTS = true
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let input = config.chat.to_initiation_input();

        assert_eq!(input.contact_flow_id, "cf-1");
        assert_eq!(input.display_name, "Jane");
        assert_eq!(
            input.api_gateway_endpoint.as_deref(),
            Some("https://gw.example.com/prod")
        );
        assert!(input.feature_permissions.is_enabled("ATTACHMENTS"));
        assert_eq!(input.content_types(), vec!["text/plain", "text/markdown"]);
        assert!(input.requires_factory());
    }

    #[test]
    fn test_to_orchestrator_params() {
        let session = FileSessionConfig {
            default_language: Some("ja_JP".to_string()),
            close_superseded_sessions: false,
            ..FileSessionConfig::default()
        };
        let params = session.to_orchestrator_params();
        assert_eq!(params.default_language.as_str(), "ja_JP");
        assert!(!params.close_superseded_sessions);

        let params = FileSessionConfig::default().to_orchestrator_params();
        assert_eq!(params.default_language.as_str(), "en_US");
    }
}
