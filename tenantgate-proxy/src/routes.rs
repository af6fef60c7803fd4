//! Enforcer routes: the rules and alerts hooks bound to one configuration.
//!
//! The outer proxy decides which hook a response goes through; these are
//! the hooks it picks from.

use std::sync::Arc;

use http::request;
use tenantgate_core::api::{AlertsData, ApiResponse, RulesData};
use tenantgate_core::config::EnforcerConfig;
use tenantgate_core::error::RewriteResult;
use tenantgate_core::filter::{Enforcement, filter_alerts, filter_rules};
use tenantgate_core::matcher::LabelMatcher;

use crate::metrics::RewriteMetrics;
use crate::modify::{ModifyResponse, ResponseTransform};
use crate::rewrite_config::RewriteConfig;

/// Filters `/api/v1/rules` payloads.
#[derive(Debug, Clone)]
pub struct RuleFilter {
    config: Arc<EnforcerConfig>,
}

impl RuleFilter {
    pub fn new(config: Arc<EnforcerConfig>) -> Self {
        Self { config }
    }
}

impl ResponseTransform for RuleFilter {
    type Output = RulesData;

    fn endpoint(&self) -> &'static str {
        "rules"
    }

    fn transform(
        &self,
        label_values: &[String],
        _request: &request::Parts,
        response: &ApiResponse,
    ) -> RewriteResult<RulesData> {
        let data: RulesData = response.payload("rules")?;
        let matcher = LabelMatcher::new(self.config.matcher, label_values)?;
        Ok(filter_rules(
            data,
            &Enforcement::new(&self.config.label, &matcher),
            self.config.rules_with_active_alerts,
        ))
    }
}

/// Filters `/api/v1/alerts` payloads.
#[derive(Debug, Clone)]
pub struct AlertFilter {
    config: Arc<EnforcerConfig>,
}

impl AlertFilter {
    pub fn new(config: Arc<EnforcerConfig>) -> Self {
        Self { config }
    }
}

impl ResponseTransform for AlertFilter {
    type Output = AlertsData;

    fn endpoint(&self) -> &'static str {
        "alerts"
    }

    fn transform(
        &self,
        label_values: &[String],
        _request: &request::Parts,
        response: &ApiResponse,
    ) -> RewriteResult<AlertsData> {
        let data: AlertsData = response.payload("alerts")?;
        let matcher = LabelMatcher::new(self.config.matcher, label_values)?;
        Ok(filter_alerts(
            data,
            &Enforcement::new(&self.config.label, &matcher),
        ))
    }
}

/// Builds the response hooks for one enforcer configuration.
///
/// Configuration is shared read-only between all hooks and requests.
#[derive(Debug, Clone)]
pub struct Routes {
    config: Arc<EnforcerConfig>,
    rewrite: RewriteConfig,
    metrics: Option<Arc<RewriteMetrics>>,
}

impl Routes {
    pub fn new(config: EnforcerConfig) -> Self {
        Self {
            config: Arc::new(config),
            rewrite: RewriteConfig::default(),
            metrics: None,
        }
    }

    pub fn with_rewrite_config(mut self, rewrite: RewriteConfig) -> Self {
        self.rewrite = rewrite;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<RewriteMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &EnforcerConfig {
        &self.config
    }

    /// Hook for `/api/v1/rules` responses.
    pub fn rules(&self) -> ModifyResponse<RuleFilter> {
        self.hook(RuleFilter::new(self.config.clone()))
    }

    /// Hook for `/api/v1/alerts` responses.
    pub fn alerts(&self) -> ModifyResponse<AlertFilter> {
        self.hook(AlertFilter::new(self.config.clone()))
    }

    fn hook<T: ResponseTransform>(&self, transform: T) -> ModifyResponse<T> {
        let hook = ModifyResponse::new(transform, self.rewrite.clone());
        match &self.metrics {
            Some(metrics) => hook.with_metrics(metrics.clone()),
            None => hook,
        }
    }
}
