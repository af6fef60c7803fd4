//! Configuration loading and validation.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

use super::error::ConfigError;
use super::schema::EnforcerConfig;

/// Configuration file search paths (in priority order).
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(path) = std::env::var("TENANTGATE_CONFIG") {
        paths.push(PathBuf::from(path));
    }

    paths.push(PathBuf::from("/etc/tenantgate/config.yaml"));
    paths.push(PathBuf::from("./config.yaml"));

    paths
}

/// Find the first existing config file from the search paths.
///
/// An explicit path wins and is never substituted by a default location.
pub fn find_config_file(explicit_path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::ConfigFileNotFound {
            searched: vec![path.to_path_buf()],
        });
    }

    let paths = default_config_paths();
    for path in &paths {
        if path.exists() {
            return Ok(path.clone());
        }
    }

    Err(ConfigError::ConfigFileNotFound { searched: paths })
}

/// Load configuration from a file path.
pub fn load_config(path: &Path) -> Result<EnforcerConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;

    if contents.trim().is_empty() {
        return Err(ConfigError::EmptyConfigFile);
    }

    let contents = substitute_env_vars(&contents)?;
    let config: EnforcerConfig = serde_saphyr::from_str(&contents)?;

    Ok(config)
}

/// Load and validate configuration.
pub fn load_and_validate(path: &Path) -> Result<EnforcerConfig, ConfigError> {
    let config = load_config(path)?;
    validate(&config)?;
    debug!(
        path = %path.display(),
        label = %config.label,
        matcher = ?config.matcher,
        rules_with_active_alerts = config.rules_with_active_alerts,
        "Loaded enforcer configuration"
    );
    Ok(config)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Environment Variable Substitution
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

// SAFETY: .expect() on LazyLock with a compile-time literal regex pattern.
// The pattern is known-valid and tested by test_patterns_compile().
static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("BUG: ENV_VAR_PATTERN regex is invalid")
});

static LABEL_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("BUG: LABEL_NAME_PATTERN regex is invalid")
});

/// Substitute environment variables in a string.
///
/// # Syntax
/// - `${VAR}` - Required, fail if not set
/// - `${VAR:-default}` - Optional with default
pub fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut missing = None;

    let result = ENV_VAR_PATTERN.replace_all(content, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(value) => value,
            Err(_) => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            },
        }
    });

    if let Some(var) = missing {
        return Err(ConfigError::MissingEnvVar {
            var,
            field: "configuration".to_string(),
        });
    }

    Ok(result.into_owned())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Validate a configuration.
pub fn validate(config: &EnforcerConfig) -> Result<(), ConfigError> {
    if config.schema != 1 {
        return Err(ConfigError::UnsupportedSchemaVersion {
            version: config.schema,
        });
    }

    if !LABEL_NAME_PATTERN.is_match(&config.label) {
        return Err(ConfigError::InvalidLabelName {
            label: config.label.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatcherMode;
    use serial_test::serial;
    use std::io::Write;

    const MINIMAL_CONFIG: &str = r#"
schema: 1
label: tenant
"#;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_patterns_compile() {
        let _ = &*ENV_VAR_PATTERN;
        let _ = &*LABEL_NAME_PATTERN;
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: EnforcerConfig = serde_saphyr::from_str(MINIMAL_CONFIG).unwrap();
        assert_eq!(config, EnforcerConfig::new("tenant"));
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
schema: 1
label: namespace
matcher: regex
rules_with_active_alerts: true
"#;
        let config: EnforcerConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.label, "namespace");
        assert_eq!(config.matcher, MatcherMode::Regex);
        assert!(config.rules_with_active_alerts);
    }

    #[test]
    fn test_unknown_matcher_rejected() {
        let yaml = "schema: 1\nlabel: tenant\nmatcher: fuzzy\n";
        assert!(serde_saphyr::from_str::<EnforcerConfig>(yaml).is_err());
    }

    #[test]
    fn test_unsupported_schema_version() {
        let config = EnforcerConfig {
            schema: 2,
            ..EnforcerConfig::new("tenant")
        };
        assert!(matches!(
            validate(&config),
            Err(ConfigError::UnsupportedSchemaVersion { version: 2 })
        ));
    }

    #[test]
    fn test_invalid_label_name() {
        for label in ["", "9tenant", "tenant-id", "tenant id"] {
            let config = EnforcerConfig::new(label);
            assert!(
                matches!(validate(&config), Err(ConfigError::InvalidLabelName { .. })),
                "label {label:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_and_validate_from_file() {
        let file = write_config("schema: 1\nlabel: tenant\nmatcher: glob\n");
        let config = load_and_validate(file.path()).unwrap();
        assert_eq!(config.matcher, MatcherMode::Glob);
    }

    #[test]
    fn test_empty_config_file() {
        let file = write_config("   \n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::EmptyConfigFile)
        ));
    }

    #[test]
    fn test_explicit_missing_path() {
        let err = find_config_file(Some(Path::new("/nonexistent/tenantgate.yaml"))).unwrap_err();
        match err {
            ConfigError::ConfigFileNotFound { searched } => {
                assert_eq!(searched, vec![PathBuf::from("/nonexistent/tenantgate.yaml")]);
            }
            other => panic!("expected ConfigFileNotFound, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_required() {
        unsafe {
            std::env::set_var("TENANTGATE_TEST_LABEL", "namespace");
        }
        let result = substitute_env_vars("label: ${TENANTGATE_TEST_LABEL}").unwrap();
        assert_eq!(result, "label: namespace");
        unsafe {
            std::env::remove_var("TENANTGATE_TEST_LABEL");
        }
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_with_default() {
        unsafe {
            std::env::remove_var("TENANTGATE_MISSING_VAR");
        }
        let result = substitute_env_vars("label: ${TENANTGATE_MISSING_VAR:-tenant}").unwrap();
        assert_eq!(result, "label: tenant");
    }

    #[test]
    #[serial]
    fn test_env_var_substitution_missing_required() {
        unsafe {
            std::env::remove_var("TENANTGATE_REQUIRED_VAR");
        }
        let result = substitute_env_vars("label: ${TENANTGATE_REQUIRED_VAR}");
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar { ref var, .. }) if var == "TENANTGATE_REQUIRED_VAR"
        ));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        let file = write_config(MINIMAL_CONFIG);
        unsafe {
            std::env::set_var("TENANTGATE_CONFIG", file.path());
        }
        let found = find_config_file(None).unwrap();
        assert_eq!(found, file.path());
        unsafe {
            std::env::remove_var("TENANTGATE_CONFIG");
        }
    }
}
