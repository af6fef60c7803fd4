//! Codec for the `{status, data, ...}` envelope around every API response.
//!
//! Decoding undoes gzip content encoding, parses the envelope, and rejects
//! anything whose status is not "success". The payload stays an opaque JSON
//! value until a transform asks for a typed document. Encoding never
//! recompresses: callers must drop `Content-Encoding` when
//! [`Decoded::decompressed`] is set.

use std::borrow::Cow;
use std::io::Read;

use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RewriteError, RewriteResult};

/// The only envelope status this layer will rewrite.
pub const STATUS_SUCCESS: &str = "success";

/// The generic API response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub infos: Vec<String>,
}

impl ApiResponse {
    /// A successful envelope around `data`.
    pub fn success(data: Value) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
            error_type: String::new(),
            error: String::new(),
            warnings: Vec::new(),
            infos: Vec::new(),
        }
    }

    /// Decode the opaque payload as a typed document.
    ///
    /// `kind` names the document in the error ("rules", "alerts").
    pub fn payload<T: DeserializeOwned>(&self, kind: &'static str) -> RewriteResult<T> {
        T::deserialize(&self.data).map_err(|source| RewriteError::PayloadDecode { kind, source })
    }
}

/// A decoded envelope and whether the body had to be decompressed.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub response: ApiResponse,
    pub decompressed: bool,
}

/// Decode a raw backend body.
///
/// `content_encoding` is the value of the response's `Content-Encoding`
/// header, if any. `gzip` and `x-gzip` are undone; `identity` or an empty
/// value are treated as plain JSON; anything else fails. A gzip body that
/// inflates past `max_decoded` bytes fails with [`RewriteError::Body`].
pub fn decode(
    body: &[u8],
    content_encoding: Option<&str>,
    max_decoded: usize,
) -> RewriteResult<Decoded> {
    let encoding = content_encoding.map(|e| e.trim().to_ascii_lowercase());
    let (json, decompressed): (Cow<'_, [u8]>, bool) = match encoding.as_deref() {
        None | Some("") | Some("identity") => (Cow::Borrowed(body), false),
        Some("gzip") | Some("x-gzip") => (Cow::Owned(gunzip(body, max_decoded)?), true),
        Some(other) => {
            return Err(RewriteError::Decompression(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("unsupported content encoding {other:?}"),
            )));
        }
    };

    let response: ApiResponse =
        serde_json::from_slice(&json).map_err(RewriteError::MalformedEnvelope)?;

    if response.status != STATUS_SUCCESS {
        return Err(RewriteError::UpstreamStatus {
            status: response.status,
        });
    }

    Ok(Decoded {
        response,
        decompressed,
    })
}

/// Encode `payload` into the envelope's `data` field and serialize the
/// envelope, followed by a newline.
pub fn encode<T: Serialize>(mut response: ApiResponse, payload: &T) -> RewriteResult<Vec<u8>> {
    response.data = serde_json::to_value(payload).map_err(RewriteError::PayloadEncode)?;
    let mut buf = serde_json::to_vec(&response).map_err(RewriteError::EnvelopeEncode)?;
    buf.push(b'\n');
    Ok(buf)
}

fn gunzip(body: &[u8], max_decoded: usize) -> RewriteResult<Vec<u8>> {
    let mut out = Vec::new();
    MultiGzDecoder::new(body)
        .take(max_decoded as u64 + 1)
        .read_to_end(&mut out)
        .map_err(RewriteError::Decompression)?;
    if out.len() > max_decoded {
        return Err(RewriteError::Body(format!(
            "decompressed response body exceeds {max_decoded} bytes"
        )));
    }
    Ok(out)
}
