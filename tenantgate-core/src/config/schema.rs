//! Configuration schema type definitions.

use serde::{Deserialize, Serialize};

use crate::matcher::MatcherMode;

/// Root configuration structure.
///
/// # Example
/// ```yaml
/// schema: 1
/// label: tenant
/// matcher: exact
/// rules_with_active_alerts: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EnforcerConfig {
    /// Schema version (must be 1).
    pub schema: u32,

    /// Name of the label whose value decides tenant visibility.
    pub label: String,

    /// How the caller's allowed values are matched.
    #[serde(default)]
    pub matcher: MatcherMode,

    /// Expose alerting rules that don't match themselves but have matching
    /// alerts, trimmed down to those alerts.
    #[serde(default)]
    pub rules_with_active_alerts: bool,
}

impl EnforcerConfig {
    /// A schema-1 configuration enforcing `label` with exact matching.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            schema: 1,
            label: label.into(),
            matcher: MatcherMode::default(),
            rules_with_active_alerts: false,
        }
    }

    pub fn with_matcher(mut self, matcher: MatcherMode) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn with_rules_with_active_alerts(mut self, enabled: bool) -> Self {
        self.rules_with_active_alerts = enabled;
        self
    }
}
