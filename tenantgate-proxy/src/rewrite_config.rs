//! Runtime limits for response rewriting.
//!
//! All parameters can be overridden via environment variables.

use tracing::warn;

/// Runtime configuration for response interception hooks.
#[derive(Debug, Clone)]
pub struct RewriteConfig {
    /// Maximum backend response body size in bytes. Applies both to the
    /// body as received and to its decompressed form. Larger bodies fail
    /// the rewrite.
    pub max_response_bytes: usize,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            max_response_bytes: 10 * 1024 * 1024, // 10 MB
        }
    }
}

impl RewriteConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// # Environment Variables
    ///
    /// - `TENANTGATE_MAX_RESPONSE_BYTES` (default: 10485760 = 10MB)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            max_response_bytes: parse_env_warn(
                "TENANTGATE_MAX_RESPONSE_BYTES",
                default.max_response_bytes,
            ),
        }
    }
}

/// Parse an environment variable with a warning on invalid values.
///
/// If the env var is set but cannot be parsed, logs a warning and returns the default.
/// If the env var is not set, returns the default silently.
fn parse_env_warn<T: std::str::FromStr + std::fmt::Display>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(val) => match val.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    env_var = name,
                    value = %val,
                    default = %default,
                    "Invalid value for environment variable, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}
