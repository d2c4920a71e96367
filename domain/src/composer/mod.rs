//! Composer feature flags derived at initiation time.

use crate::initiation::{descriptor::SessionDescriptor, input::InitiationInput};
use serde::{Deserialize, Serialize};

/// Capability name gating attachment upload.
pub const ATTACHMENTS_PERMISSION: &str = "ATTACHMENTS";

/// Content type that enables rich (markdown) messaging.
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown";

/// Which optional composer features are available for the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerConfig {
    pub attachments_enabled: bool,
    pub rich_messaging_enabled: bool,
}

impl ComposerConfig {
    /// Derive the flags from the caller input and the session descriptor.
    ///
    /// Pure: absent or malformed inputs yield `false`.
    pub fn derive(input: &InitiationInput, descriptor: &SessionDescriptor) -> Self {
        let attachments_enabled = input.feature_permissions.is_enabled(ATTACHMENTS_PERMISSION)
            || descriptor
                .feature_permissions
                .as_ref()
                .is_some_and(|p| p.is_enabled(ATTACHMENTS_PERMISSION));

        let rich_messaging_enabled = input
            .content_types()
            .into_iter()
            .any(|t| t == MARKDOWN_CONTENT_TYPE);

        Self {
            attachments_enabled,
            rich_messaging_enabled,
        }
    }
}
