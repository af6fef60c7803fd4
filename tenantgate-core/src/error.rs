//! Error taxonomy for response rewriting.
//!
//! Every stage of a rewrite fails closed: any of these errors abandons the
//! rewrite and the partially built response is dropped.

use thiserror::Error;

use crate::matcher::MatcherError;

/// Errors raised while decoding, filtering, or encoding an API response.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// The backend body could not be read or exceeded the buffer limit.
    #[error("can't read the response body: {0}")]
    Body(String),

    /// The body claimed a content encoding that could not be undone.
    #[error("decompression error: {0}")]
    Decompression(#[source] std::io::Error),

    /// The body is not a well-formed API envelope.
    #[error("JSON decoding error: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// The envelope's `status` field was something other than "success".
    #[error("unexpected response status: {status:?}")]
    UpstreamStatus { status: String },

    /// The envelope's `data` field does not match the expected document.
    #[error("can't decode {kind} data: {source}")]
    PayloadDecode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The filtering logic itself failed.
    #[error("transform failed: {0}")]
    Transform(#[from] MatcherError),

    /// The filtered document could not be serialized.
    #[error("can't encode the data: {0}")]
    PayloadEncode(#[source] serde_json::Error),

    /// The envelope could not be serialized.
    #[error("can't encode the response: {0}")]
    EnvelopeEncode(#[source] serde_json::Error),

    /// The request context did not carry the caller's allowed label values.
    #[error("no allowed label values in the request context")]
    MissingLabelValues,
}

impl RewriteError {
    /// Short, stable name of the failing stage for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            RewriteError::Body(_) => "body",
            RewriteError::Decompression(_) => "decompression",
            RewriteError::MalformedEnvelope(_) => "malformed_envelope",
            RewriteError::UpstreamStatus { .. } => "upstream_status",
            RewriteError::PayloadDecode { .. } => "payload_decode",
            RewriteError::Transform(_) => "transform",
            RewriteError::PayloadEncode(_) => "payload_encode",
            RewriteError::EnvelopeEncode(_) => "envelope_encode",
            RewriteError::MissingLabelValues => "missing_label_values",
        }
    }
}

/// Result type alias for rewrite operations.
pub type RewriteResult<T> = Result<T, RewriteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_display() {
        let err = RewriteError::UpstreamStatus {
            status: "error".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected response status: \"error\"");
        assert_eq!(err.stage(), "upstream_status");
    }

    #[test]
    fn test_transform_wraps_matcher_error() {
        let err: RewriteError = MatcherError::NoValues.into();
        assert!(matches!(err, RewriteError::Transform(MatcherError::NoValues)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
