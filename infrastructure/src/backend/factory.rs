//! HTTP session descriptor factory (API gateway)

use super::protocol::{StartChatRequest, parse_start_chat_response};
use async_trait::async_trait;
use chatlink_application::{DescriptorCreationError, SessionDescriptorFactory};
use chatlink_domain::{InitiationInput, SessionDescriptor};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Creates chat contacts by POSTing to an API gateway endpoint.
///
/// The endpoint comes from the initiation input; a factory-level default is
/// used when the input carries none.
pub struct HttpSessionDescriptorFactory {
    client: reqwest::Client,
    default_endpoint: Option<String>,
}

impl HttpSessionDescriptorFactory {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    /// Build with a per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, DescriptorCreationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DescriptorCreationError::Network(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            default_endpoint: None,
        }
    }

    pub fn with_default_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.default_endpoint = Some(endpoint.into());
        self
    }

    fn endpoint<'a>(&'a self, input: &'a InitiationInput) -> Option<&'a str> {
        input
            .api_gateway_endpoint
            .as_deref()
            .or(self.default_endpoint.as_deref())
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }
}

impl Default for HttpSessionDescriptorFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionDescriptorFactory for HttpSessionDescriptorFactory {
    async fn create(
        &self,
        input: &InitiationInput,
    ) -> Result<SessionDescriptor, DescriptorCreationError> {
        input.validate_for_creation()?;
        let endpoint = self
            .endpoint(input)
            .ok_or(DescriptorCreationError::MissingEndpoint)?;

        debug!(
            "Creating chat for contact flow {} via {}",
            input.contact_flow_id, endpoint
        );

        let response = self
            .client
            .post(endpoint)
            .json(&StartChatRequest::from_input(input))
            .send()
            .await
            .map_err(|e| DescriptorCreationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DescriptorCreationError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!("Chat creation rejected with status {}", status);
            return Err(DescriptorCreationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let descriptor = parse_start_chat_response(&body)?;
        info!("Chat contact {} created", descriptor.contact_id());
        Ok(descriptor)
    }
}
