//! tenantgate core: transport-agnostic tenant filtering for Prometheus
//! rule and alert listings.
//!
//! The `/api/v1/rules` and `/api/v1/alerts` endpoints return every rule and
//! alert known to the backend, whatever label selector the caller used. This
//! crate decodes those responses, removes everything whose enforced label is
//! not one of the tenant's allowed values, and encodes the result again.
//!
//! - [`api`]: envelope codec and the rule/alert document model.
//! - [`matcher`]: predicate over allowed label values (exact, regex, glob).
//! - [`filter`]: the rule-filtering and alert-filtering transforms.
//! - [`config`]: YAML enforcer configuration.
//! - [`error`]: the rewrite error taxonomy.
//!
//! The HTTP interception hook that ties these together lives in
//! `tenantgate-proxy`.

pub mod api;
pub mod config;
pub mod error;
pub mod filter;
pub mod matcher;
