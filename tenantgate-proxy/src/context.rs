//! Per-request allowed label values.
//!
//! The outer proxy authorizes the caller and stores the values the caller
//! may see in the request's extensions before the response hook runs.
//! Hooks read them back with [`must_label_values`]; a missing entry is a
//! wiring bug and fails the rewrite instead of allowing everything.

use http::{Extensions, Request};
use tenantgate_core::error::{RewriteError, RewriteResult};

/// Allowed values of the enforced label for one request, in caller order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedLabelValues(Vec<String>);

impl AllowedLabelValues {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Store `values` in `request`'s extensions, replacing any earlier entry.
pub fn with_label_values<B>(request: &mut Request<B>, values: Vec<String>) {
    request
        .extensions_mut()
        .insert(AllowedLabelValues::new(values));
}

/// The allowed values stored in `extensions`, if any.
pub fn label_values(extensions: &Extensions) -> Option<&[String]> {
    extensions
        .get::<AllowedLabelValues>()
        .map(AllowedLabelValues::as_slice)
}

/// The allowed values stored in `extensions`, failing when absent.
pub fn must_label_values(extensions: &Extensions) -> RewriteResult<&[String]> {
    label_values(extensions).ok_or(RewriteError::MissingLabelValues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_extensions() {
        let mut request = Request::new(());
        with_label_values(&mut request, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            must_label_values(request.extensions()).unwrap(),
            ["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_missing_values_fail() {
        let request = Request::new(());
        assert!(label_values(request.extensions()).is_none());
        assert!(matches!(
            must_label_values(request.extensions()),
            Err(RewriteError::MissingLabelValues)
        ));
    }

    #[test]
    fn test_later_insert_replaces_earlier() {
        let mut request = Request::new(());
        with_label_values(&mut request, vec!["a".to_string()]);
        with_label_values(&mut request, vec!["b".to_string()]);
        assert_eq!(label_values(request.extensions()), Some(&["b".to_string()][..]));
    }
}
