//! tenantgate HTTP layer.
//!
//! Response interception hooks that an outer reverse proxy attaches to the
//! Prometheus `/api/v1/rules` and `/api/v1/alerts` endpoints. Each hook
//! buffers the backend response, filters it down to what the tenant may
//! see, and hands back either the untouched response (non-200), a fully
//! rewritten response, or a single [`error::ModifyResponseError`].
//!
//! ```text
//! outer proxy ──► with_label_values(request, allowed)
//!                        │
//!       backend response │
//!                        ▼
//!   Routes::rules() / Routes::alerts() ──► ModifyResponse::modify_response()
//!                        │
//!        ┌───────────────┼──────────────────┐
//!        ▼               ▼                  ▼
//!   passthrough     rewritten body   ModifyResponseError
//! ```

pub mod context;
pub mod error;
pub mod metrics;
pub mod modify;
pub mod rewrite_config;
pub mod routes;
