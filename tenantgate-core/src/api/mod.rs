//! Prometheus HTTP API v1 response shapes and the envelope codec.

pub mod envelope;
pub mod labels;
pub mod model;

pub use envelope::{ApiResponse, Decoded, STATUS_SUCCESS, decode, encode};
pub use labels::LabelSet;
pub use model::{Alert, AlertingRule, AlertsData, RecordingRule, Rule, RuleGroup, RulesData};
