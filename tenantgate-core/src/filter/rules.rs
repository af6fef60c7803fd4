//! Rule listing filter.
//!
//! Each rule is either kept whole, dropped, or (for alerting rules, when
//! `rules_with_active_alerts` is on) replaced by a synthetic rule that
//! carries only the alerts the tenant may see. Groups left without rules
//! are dropped.

use tracing::debug;

use super::Enforcement;
use crate::api::model::{STATE_FIRING, STATE_PENDING};
use crate::api::{AlertingRule, Rule, RulesData};

/// Keep only the rule groups, rules, and alerts the tenant may see.
///
/// A rule whose own label matches is kept unchanged, with all of its
/// alerts. Otherwise, if `rules_with_active_alerts` is set and the rule is
/// an alerting rule, the matching alerts are gathered into a synthetic
/// rule. Recording rules have no such fallback.
pub fn filter_rules(
    data: RulesData,
    enforcement: &Enforcement<'_>,
    rules_with_active_alerts: bool,
) -> RulesData {
    let original_groups = data.groups.len();
    let mut original_rules = 0;
    let mut kept_rules = 0;

    let mut groups = Vec::new();
    for mut group in data.groups {
        original_rules += group.rules.len();

        let mut visible = Vec::new();
        for rule in std::mem::take(&mut group.rules) {
            if enforcement.allows(rule.labels()) {
                visible.push(rule);
                continue;
            }

            if !rules_with_active_alerts {
                continue;
            }

            if let Rule::Alerting(parent) = &rule {
                if let Some(partial) = partial_alerting_rule(parent, enforcement) {
                    visible.push(Rule::Alerting(partial));
                }
            }
        }

        if !visible.is_empty() {
            kept_rules += visible.len();
            group.rules = visible;
            groups.push(group);
        }
    }

    if groups.len() != original_groups || kept_rules != original_rules {
        debug!(
            label = enforcement.label,
            groups_before = original_groups,
            groups_after = groups.len(),
            rules_before = original_rules,
            rules_after = kept_rules,
            "Filtered rule groups by label"
        );
    }

    RulesData { groups }
}

/// Build a copy of `parent` holding only the alerts the tenant may see.
///
/// Returns `None` when no alert matches. The copy takes the parent's
/// labels and annotations, and its state is the first matching alert's
/// state, upgraded from "pending" to "firing" if a later matching alert
/// is firing.
fn partial_alerting_rule(
    parent: &AlertingRule,
    enforcement: &Enforcement<'_>,
) -> Option<AlertingRule> {
    let mut partial: Option<AlertingRule> = None;

    for (i, alert) in parent.alerts.iter().enumerate() {
        if !enforcement.allows(&alert.labels) {
            continue;
        }

        let rule = partial.get_or_insert_with(|| AlertingRule {
            state: String::new(),
            name: parent.name.clone(),
            query: parent.query.clone(),
            duration: parent.duration,
            keep_firing_for: parent.keep_firing_for,
            labels: parent.labels.clone(),
            annotations: parent.annotations.clone(),
            alerts: Vec::new(),
            health: parent.health.clone(),
            last_error: parent.last_error.clone(),
            evaluation_time: parent.evaluation_time,
            last_evaluation: parent.last_evaluation,
        });

        rule.alerts.push(alert.clone());

        // State is read by position in the parent's alert list, not in the
        // filtered list.
        let state = &parent.alerts[i].state;
        match rule.state.as_str() {
            "" => rule.state = state.clone(),
            STATE_PENDING if state == STATE_FIRING => rule.state = state.clone(),
            _ => {}
        }
    }

    partial
}
