//! The single error surfaced by response interception hooks.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use tenantgate_core::error::RewriteError;
use thiserror::Error;

/// Returned when a hook failed to process the backend's API response.
///
/// The outer proxy only needs to branch on this type; the stage-specific
/// cause is kept for diagnostics. The response it belonged to must not be
/// forwarded.
#[derive(Error, Debug)]
#[error("failed to process the API response: {source}")]
pub struct ModifyResponseError {
    #[source]
    source: RewriteError,
}

impl ModifyResponseError {
    pub fn new(source: RewriteError) -> Self {
        Self { source }
    }

    /// The stage-specific cause.
    pub fn cause(&self) -> &RewriteError {
        &self.source
    }

    pub fn into_cause(self) -> RewriteError {
        self.source
    }

    /// Convert the error into the response sent to the client.
    ///
    /// The body never carries the cause, which may quote backend data.
    pub fn to_response(&self) -> Response<Full<Bytes>> {
        Response::builder()
            .status(StatusCode::BAD_GATEWAY)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from_static(
                b"502 Bad Gateway\n\nFailed to process the upstream API response.",
            )))
            .unwrap_or_else(|_| {
                let mut resp = Response::new(Full::new(Bytes::from("502 Bad Gateway")));
                *resp.status_mut() = StatusCode::BAD_GATEWAY;
                resp
            })
    }
}

impl From<RewriteError> for ModifyResponseError {
    fn from(source: RewriteError) -> Self {
        Self::new(source)
    }
}
