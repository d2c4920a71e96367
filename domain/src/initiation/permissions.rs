//! Feature permission mapping (capability name → flag).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named capability flags gating optional behavior (e.g. attachments).
///
/// Values arrive from callers and from the backend, so they are kept as raw
/// JSON and interpreted leniently by [`is_enabled`](Self::is_enabled).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeaturePermissions(BTreeMap<String, Value>);

impl FeaturePermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, capability: impl Into<String>, enabled: bool) -> Self {
        self.set(capability, enabled);
        self
    }

    pub fn set(&mut self, capability: impl Into<String>, enabled: bool) {
        self.0.insert(capability.into(), Value::Bool(enabled));
    }

    /// Whether `capability` is switched on.
    ///
    /// Capability names match case-insensitively; an exact-case entry wins
    /// over other spellings. Accepts `true`, the strings `"true"`/`"1"` (any case) and the number `1`.
    /// Anything else, including an absent entry, is off.
    pub fn is_enabled(&self, capability: &str) -> bool {
        let value = self.0.get(capability).or_else(|| {
            self.0
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(capability))
                .map(|(_, value)| value)
        });

        match value {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => {
                let s = s.trim();
                s.eq_ignore_ascii_case("true") || s == "1"
            }
            Some(Value::Number(n)) => n.as_u64() == Some(1),
            _ => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, bool)> for FeaturePermissions {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k, Value::Bool(v))).collect())
    }
}
