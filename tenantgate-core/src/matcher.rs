//! Predicate over a tenant's allowed label values.
//!
//! The filtering transforms only ever call [`LabelMatcher::matches`]; how
//! the matcher was built is decided by the enforcer configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// How allowed label values are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherMode {
    /// Value must equal one of the allowed values.
    #[default]
    Exact,
    /// The single allowed value is a fully anchored regular expression.
    Regex,
    /// Each allowed value is a glob pattern.
    Glob,
}

/// Errors building a matcher from allowed values.
#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("no allowed label values")]
    NoValues,

    #[error("regex matching requires exactly one label value, got {count}")]
    RegexValueCount { count: usize },

    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A compiled matcher for one request's allowed values.
#[derive(Debug, Clone)]
pub enum LabelMatcher {
    Exact(HashSet<String>),
    Regex(Regex),
    Glob(Vec<glob::Pattern>),
}

impl LabelMatcher {
    /// Build a matcher over `values` using `mode`.
    ///
    /// An empty value list is rejected in every mode.
    pub fn new(mode: MatcherMode, values: &[String]) -> Result<Self, MatcherError> {
        if values.is_empty() {
            return Err(MatcherError::NoValues);
        }

        match mode {
            MatcherMode::Exact => Ok(LabelMatcher::Exact(values.iter().cloned().collect())),
            MatcherMode::Regex => {
                let [pattern] = values else {
                    return Err(MatcherError::RegexValueCount {
                        count: values.len(),
                    });
                };
                // Anchored on both ends, like PromQL's =~.
                let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| {
                    MatcherError::InvalidRegex {
                        pattern: pattern.clone(),
                        source,
                    }
                })?;
                Ok(LabelMatcher::Regex(regex))
            }
            MatcherMode::Glob => values
                .iter()
                .map(|pattern| {
                    glob::Pattern::new(pattern).map_err(|source| MatcherError::InvalidGlob {
                        pattern: pattern.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(LabelMatcher::Glob),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            LabelMatcher::Exact(values) => values.contains(value),
            LabelMatcher::Regex(regex) => regex.is_match(value),
            LabelMatcher::Glob(patterns) => patterns.iter().any(|p| p.matches(value)),
        }
    }
}
