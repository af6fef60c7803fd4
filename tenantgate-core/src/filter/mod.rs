//! Tenant visibility filtering for rule and alert listings.
//!
//! # Fail-Closed Semantics
//!
//! - A record whose enforced label is missing or empty is never visible.
//! - A record is visible only when the matcher accepts its label value.

pub mod alerts;
pub mod rules;

pub use alerts::filter_alerts;
pub use rules::filter_rules;

use crate::api::LabelSet;
use crate::matcher::LabelMatcher;

/// The enforced label name paired with the request's matcher.
#[derive(Debug, Clone, Copy)]
pub struct Enforcement<'a> {
    pub label: &'a str,
    pub matcher: &'a LabelMatcher,
}

impl<'a> Enforcement<'a> {
    pub fn new(label: &'a str, matcher: &'a LabelMatcher) -> Self {
        Self { label, matcher }
    }

    /// Whether a record carrying `labels` may be shown to the tenant.
    pub fn allows(&self, labels: &LabelSet) -> bool {
        let value = labels.get(self.label);
        !value.is_empty() && self.matcher.matches(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatcherMode;

    #[test]
    fn test_empty_label_value_never_allowed() {
        // A glob of "*" matches the empty string, the enforcer must still refuse it.
        let matcher = LabelMatcher::new(MatcherMode::Glob, &["*".to_string()]).unwrap();
        let enforcement = Enforcement::new("tenant", &matcher);

        let missing = LabelSet::new();
        let empty: LabelSet = [("tenant", "")].into_iter().collect();
        let present: LabelSet = [("tenant", "a")].into_iter().collect();

        assert!(!enforcement.allows(&missing));
        assert!(!enforcement.allows(&empty));
        assert!(enforcement.allows(&present));
    }
}
