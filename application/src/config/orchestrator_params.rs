//! Orchestrator parameters - initiation behavior control.
//!
//! [`OrchestratorParams`] groups the static parameters used by
//! [`InitiationOrchestrator`](crate::use_cases::initiate_chat::InitiationOrchestrator).
//! These are application-layer concerns, not domain policy.

use chatlink_domain::Language;
use serde::{Deserialize, Serialize};

/// Initiation behavior parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorParams {
    /// Language used when the initiation input carries none.
    pub default_language: Language,
    /// Close sessions opened by attempts that a newer attempt superseded.
    pub close_superseded_sessions: bool,
}

impl Default for OrchestratorParams {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            close_superseded_sessions: true,
        }
    }
}

impl OrchestratorParams {
    // ==================== Builder Methods ====================

    pub fn with_default_language(mut self, language: Language) -> Self {
        self.default_language = language;
        self
    }

    pub fn with_close_superseded_sessions(mut self, close: bool) -> Self {
        self.close_superseded_sessions = close;
        self
    }

    /// Effective language for a caller-supplied tag.
    pub fn resolve_language(&self, tag: Option<&str>) -> Language {
        tag.and_then(|t| t.parse().ok())
            .unwrap_or_else(|| self.default_language.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = OrchestratorParams::default();
        assert_eq!(params.default_language.as_str(), "en_US");
        assert!(params.close_superseded_sessions);
    }

    #[test]
    fn test_resolve_language() {
        let params = OrchestratorParams::default()
            .with_default_language("de_DE".parse().unwrap());
        assert_eq!(params.resolve_language(None).as_str(), "de_DE");
        assert_eq!(params.resolve_language(Some("")).as_str(), "de_DE");
        assert_eq!(params.resolve_language(Some("ja_JP")).as_str(), "ja_JP");
    }
}
