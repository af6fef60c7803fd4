//! Enforcer configuration.
//!
//! Loaded once at startup from YAML; immutable and shared across requests
//! afterwards.

mod error;
mod loader;
mod schema;

pub use error::ConfigError;
pub use loader::{
    default_config_paths, find_config_file, load_and_validate, load_config, substitute_env_vars,
    validate,
};
pub use schema::EnforcerConfig;
