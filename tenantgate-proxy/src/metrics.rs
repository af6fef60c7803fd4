//! Prometheus metrics for response rewriting, using prometheus-client.
//!
//! The caller owns the [`Registry`] and serves it wherever its other
//! metrics are exposed.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

/// What a hook did with one backend response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Non-200 response forwarded untouched.
    Passthrough,
    /// Body replaced with the filtered document.
    Rewritten,
    /// Rewrite abandoned; the response must not be forwarded.
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Passthrough => "passthrough",
            Outcome::Rewritten => "rewritten",
            Outcome::Failed => "failed",
        }
    }
}

/// Labels for rewrite outcome counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RewriteLabels {
    /// Intercepted endpoint ("rules" or "alerts")
    pub endpoint: String,
    /// "passthrough", "rewritten" or "failed"
    pub outcome: String,
}

/// Labels for rewrite failure counters.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct FailureLabels {
    /// Intercepted endpoint ("rules" or "alerts")
    pub endpoint: String,
    /// Failing stage (e.g. "decompression", "payload_decode")
    pub stage: String,
}

/// Counters for response interception hooks.
#[derive(Clone, Debug)]
pub struct RewriteMetrics {
    pub rewrites_total: Family<RewriteLabels, Counter>,
    pub failures_total: Family<FailureLabels, Counter>,
}

impl RewriteMetrics {
    /// Create the metrics and register them in `registry`.
    pub fn new(registry: &mut Registry) -> Self {
        let rewrites_total = Family::<RewriteLabels, Counter>::default();
        registry.register(
            "tenantgate_response_rewrites",
            "Intercepted API responses by endpoint and outcome",
            rewrites_total.clone(),
        );

        let failures_total = Family::<FailureLabels, Counter>::default();
        registry.register(
            "tenantgate_response_rewrite_failures",
            "Abandoned response rewrites by endpoint and failing stage",
            failures_total.clone(),
        );

        Self {
            rewrites_total,
            failures_total,
        }
    }

    pub fn record_outcome(&self, endpoint: &str, outcome: Outcome) {
        self.rewrites_total
            .get_or_create(&RewriteLabels {
                endpoint: endpoint.to_string(),
                outcome: outcome.as_str().to_string(),
            })
            .inc();
    }

    pub fn record_failure(&self, endpoint: &str, stage: &str) {
        self.failures_total
            .get_or_create(&FailureLabels {
                endpoint: endpoint.to_string(),
                stage: stage.to_string(),
            })
            .inc();
    }
}
