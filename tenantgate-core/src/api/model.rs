//! Decoded payloads of the rules and alerts listing endpoints.
//!
//! # Wire Shapes
//!
//! ```text
//! /api/v1/rules   data: {"groups": [RuleGroup, ...]}
//! /api/v1/alerts  data: {"alerts": [Alert, ...]}
//! ```
//!
//! A rule is either alerting or recording. The `type` field picks the
//! variant in both directions; any other value fails to decode.
//!
//! Timestamps keep the UTC offset the backend sent them with.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::labels::LabelSet;

/// Alert and alerting-rule state: not yet active for the rule's `for` duration.
pub const STATE_PENDING: &str = "pending";

/// Alert and alerting-rule state: active.
pub const STATE_FIRING: &str = "firing";

/// Payload of `/api/v1/rules`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub groups: Vec<RuleGroup>,
}

/// A named set of rules evaluated together at a shared interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub name: String,
    pub file: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rules: Vec<Rule>,
    pub interval: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_time: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339_opt"
    )]
    pub last_evaluation: Option<DateTime<FixedOffset>>,
}

/// An alerting or recording rule, discriminated by the wire `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rule {
    Alerting(AlertingRule),
    Recording(RecordingRule),
}

impl Rule {
    /// The rule's own labels, whichever kind it is.
    pub fn labels(&self) -> &LabelSet {
        match self {
            Rule::Alerting(rule) => &rule.labels,
            Rule::Recording(rule) => &rule.labels,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Rule::Alerting(rule) => &rule.name,
            Rule::Recording(rule) => &rule.name,
        }
    }

    /// The wire discriminator for this rule.
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Alerting(_) => "alerting",
            Rule::Recording(_) => "recording",
        }
    }
}

/// A rule that can produce alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertingRule {
    /// Aggregate state over the rule's alerts ("inactive", "pending", "firing").
    pub state: String,
    pub name: String,
    pub query: String,
    /// The rule's `for` duration, in seconds.
    pub duration: f64,
    #[serde(default)]
    pub keep_firing_for: f64,
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default)]
    pub annotations: LabelSet,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alerts: Vec<Alert>,
    pub health: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_error: String,
    pub evaluation_time: f64,
    #[serde(serialize_with = "rfc3339")]
    pub last_evaluation: DateTime<FixedOffset>,
}

/// A rule that only records a derived series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingRule {
    pub name: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "LabelSet::is_empty")]
    pub labels: LabelSet,
    pub health: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_error: String,
    pub evaluation_time: f64,
    #[serde(serialize_with = "rfc3339")]
    pub last_evaluation: DateTime<FixedOffset>,
}

/// Payload of `/api/v1/alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertsData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub alerts: Vec<Alert>,
}

/// A single active alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default)]
    pub annotations: LabelSet,
    pub state: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339_opt"
    )]
    pub active_at: Option<DateTime<FixedOffset>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339_opt"
    )]
    pub keep_firing_since: Option<DateTime<FixedOffset>>,
    pub value: String,
}

/// Encode a timestamp as RFC 3339, writing `Z` for a zero offset.
fn rfc3339<S: Serializer>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn rfc3339_opt<S: Serializer>(
    ts: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => rfc3339(ts, serializer),
        None => serializer.serialize_none(),
    }
}

/// Decode a JSON array that the backend may send as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
