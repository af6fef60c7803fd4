//! Generic response interception pipeline.
//!
//! [`intercept`] turns a [`ResponseTransform`] (a function from the decoded
//! envelope to a new payload) into a full response rewrite:
//!
//! ```text
//! Response ──► status != 200 ─────────────────────────────► passthrough
//!    │
//!    ▼
//! buffer body (Limited) ──► decode envelope ──► allowed values from context
//!    │
//!    ▼
//! transform(values, request, envelope) ──► encode ──► replace body + headers
//! ```
//!
//! Each call yields exactly one of: the untouched response, a fully
//! rewritten response, or a [`ModifyResponseError`]. A failure at any stage
//! discards the response.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderValue, Response, StatusCode, request};
use http_body::Body;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use serde::Serialize;
use tenantgate_core::api::{ApiResponse, Decoded, decode, encode};
use tenantgate_core::error::{RewriteError, RewriteResult};
use tracing::{debug, instrument, warn};

use crate::context::must_label_values;
use crate::error::ModifyResponseError;
use crate::metrics::{Outcome, RewriteMetrics};
use crate::rewrite_config::RewriteConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body type of responses leaving a hook.
///
/// Passthrough responses keep their streaming body; rewritten responses
/// carry a buffered `Full<Bytes>`. Both are boxed for a unified return type.
pub type RewrittenBody = BoxBody<Bytes, BoxError>;

/// A decoded-payload transform applied by a response hook.
pub trait ResponseTransform: Send + Sync {
    /// The document written back into the envelope's `data` field.
    type Output: Serialize;

    /// Short endpoint name used in logs and metrics.
    fn endpoint(&self) -> &'static str;

    /// Produce the payload the caller may see.
    ///
    /// `label_values` are the caller's allowed values, read from the
    /// request context by the pipeline.
    fn transform(
        &self,
        label_values: &[String],
        request: &request::Parts,
        response: &ApiResponse,
    ) -> RewriteResult<Self::Output>;
}

/// Wrap `transform` into a response hook with default limits.
pub fn intercept<T: ResponseTransform>(transform: T) -> ModifyResponse<T> {
    ModifyResponse::new(transform, RewriteConfig::default())
}

/// A response hook built from a [`ResponseTransform`].
pub struct ModifyResponse<T> {
    transform: T,
    config: RewriteConfig,
    metrics: Option<Arc<RewriteMetrics>>,
}

impl<T: ResponseTransform> ModifyResponse<T> {
    pub fn new(transform: T, config: RewriteConfig) -> Self {
        Self {
            transform,
            config,
            metrics: None,
        }
    }

    /// Count outcomes in `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<RewriteMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Endpoint name of the wrapped transform.
    pub fn endpoint(&self) -> &'static str {
        self.transform.endpoint()
    }

    /// Rewrite the backend `response` to the request described by `request`.
    ///
    /// Non-200 responses are returned untouched. Otherwise the body is
    /// replaced by the transformed document, `Content-Length` is set to its
    /// exact size, and `Content-Encoding` is dropped if the backend body was
    /// compressed.
    ///
    /// # Errors
    ///
    /// Returns `ModifyResponseError` wrapping the failing stage. The
    /// response is consumed and must not be forwarded.
    #[instrument(
        skip_all,
        fields(endpoint = self.transform.endpoint(), status = %response.status())
    )]
    pub async fn modify_response<B>(
        &self,
        request: &request::Parts,
        response: Response<B>,
    ) -> Result<Response<RewrittenBody>, ModifyResponseError>
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let endpoint = self.transform.endpoint();

        if response.status() != StatusCode::OK {
            debug!("Passing non-200 response through");
            self.record(endpoint, Outcome::Passthrough);
            return Ok(response.map(|body| body.map_err(into_box_error).boxed()));
        }

        match self.rewrite(request, response).await {
            Ok(rewritten) => {
                self.record(endpoint, Outcome::Rewritten);
                Ok(rewritten)
            }
            Err(source) => {
                warn!(
                    stage = source.stage(),
                    error = %source,
                    "Failed to rewrite API response"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure(endpoint, source.stage());
                }
                self.record(endpoint, Outcome::Failed);
                Err(ModifyResponseError::new(source))
            }
        }
    }

    async fn rewrite<B>(
        &self,
        request: &request::Parts,
        response: Response<B>,
    ) -> RewriteResult<Response<RewrittenBody>>
    where
        B: Body<Data = Bytes> + Send + Sync + 'static,
        B::Error: Into<BoxError>,
    {
        let (mut parts, body) = response.into_parts();

        let max = self.config.max_response_bytes;
        let bytes = Limited::new(body, max)
            .collect()
            .await
            .map_err(|e| {
                if e.downcast_ref::<LengthLimitError>().is_some() {
                    RewriteError::Body(format!("response body exceeds {max} bytes"))
                } else {
                    RewriteError::Body(e.to_string())
                }
            })?
            .to_bytes();

        let content_encoding = match parts.headers.get(CONTENT_ENCODING) {
            Some(value) => Some(value.to_str().map_err(|_| {
                RewriteError::Decompression(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Content-Encoding header is not valid ASCII",
                ))
            })?),
            None => None,
        };

        let Decoded {
            response: envelope,
            decompressed,
        } = decode(&bytes, content_encoding, max)?;

        let label_values = must_label_values(&request.extensions)?;
        let payload = self.transform.transform(label_values, request, &envelope)?;
        let encoded = Bytes::from(encode(envelope, &payload)?);

        // The new body is never recompressed.
        if decompressed {
            parts.headers.remove(CONTENT_ENCODING);
        }
        parts.headers.remove(TRANSFER_ENCODING);
        parts
            .headers
            .insert(CONTENT_LENGTH, HeaderValue::from(encoded.len()));

        debug!(
            original_bytes = bytes.len(),
            rewritten_bytes = encoded.len(),
            decompressed,
            "Rewrote API response"
        );

        let body: RewrittenBody = Full::new(encoded)
            .map_err(|never| match never {})
            .boxed();
        Ok(Response::from_parts(parts, body))
    }

    fn record(&self, endpoint: &str, outcome: Outcome) {
        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(endpoint, outcome);
        }
    }
}

fn into_box_error<E: Into<BoxError>>(err: E) -> BoxError {
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::with_label_values;
    use http::Request;
    use serde_json::{Value, json};

    /// Replaces the payload with the caller's allowed values.
    struct EchoValues;

    impl ResponseTransform for EchoValues {
        type Output = Value;

        fn endpoint(&self) -> &'static str {
            "echo"
        }

        fn transform(
            &self,
            label_values: &[String],
            _request: &request::Parts,
            _response: &ApiResponse,
        ) -> RewriteResult<Value> {
            Ok(json!({ "values": label_values }))
        }
    }

    fn parts(values: Option<Vec<String>>) -> request::Parts {
        let mut request = Request::new(());
        if let Some(values) = values {
            with_label_values(&mut request, values);
        }
        request.into_parts().0
    }

    fn ok_response(body: &'static str) -> Response<Full<Bytes>> {
        Response::builder()
            .status(StatusCode::OK)
            .header(TRANSFER_ENCODING, "chunked")
            .body(Full::new(Bytes::from_static(body.as_bytes())))
            .unwrap()
    }

    #[tokio::test]
    async fn test_intercept_rewrites_body_and_headers() {
        let hook = intercept(EchoValues);
        let out = hook
            .modify_response(
                &parts(Some(vec!["a".to_string()])),
                ok_response(r#"{"status":"success","data":null,"infos":["x"]}"#),
            )
            .await
            .unwrap();

        assert!(out.headers().get(TRANSFER_ENCODING).is_none());
        let length = out.headers()[CONTENT_LENGTH].clone();
        let bytes = out.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(length, HeaderValue::from(bytes.len()));

        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            json!({"status": "success", "data": {"values": ["a"]}, "infos": ["x"]})
        );
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_wrapped() {
        let hook = intercept(EchoValues);
        let err = hook
            .modify_response(&parts(Some(vec!["a".to_string()])), ok_response("not json"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), RewriteError::MalformedEnvelope(_)));
    }

    #[tokio::test]
    async fn test_decode_runs_before_context_lookup() {
        let hook = intercept(EchoValues);
        let err = hook
            .modify_response(
                &parts(None),
                ok_response(r#"{"status":"error","error":"boom"}"#),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), RewriteError::UpstreamStatus { .. }));
    }
}
