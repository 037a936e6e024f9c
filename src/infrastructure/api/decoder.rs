//! Maps a final status and body into success bytes or a structured error

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::errors::{ApiError, ApiRequestError};
use crate::domain::models::Response;

/// Response header carrying the server trace id
pub const RAY_ID_HEADER: &str = "cf-ray";

// This endpoint answers errors with plain text instead of an envelope.
const VALIDATE_EXPRESSION_SUFFIX: &str = "/filters/validate-expr";

/// Decode the final response of a call.
///
/// - `< 400`: the body is returned untouched
/// - expression validation endpoint: the body text is the error
/// - `> 500`: opaque service failure
/// - otherwise: the body is parsed as an envelope and turned into an
///   [`ApiRequestError`]
pub fn decode_response(
    path: &str,
    status: StatusCode,
    ray_id: &str,
    body: Vec<u8>,
) -> Result<Vec<u8>, ApiError> {
    if status.as_u16() < 400 {
        return Ok(body);
    }

    let path_only = path.split(['?', '#']).next().unwrap_or(path);
    if path_only.ends_with(VALIDATE_EXPRESSION_SUFFIX) {
        return Err(ApiError::ExpressionValidation(
            String::from_utf8_lossy(&body).into_owned(),
        ));
    }

    if status.as_u16() > 500 {
        return Err(ApiError::ServiceFailure {
            status: status.as_u16(),
        });
    }

    let envelope: Response =
        serde_json::from_slice(&body).map_err(|source| ApiError::DecodeErrorBody {
            status: status.as_u16(),
            source,
        })?;

    Err(ApiError::Request(ApiRequestError {
        status_code: status.as_u16(),
        errors: envelope.errors,
        ray_id: ray_id.to_string(),
    }))
}

/// Decode a successful body into the typed envelope a facade expects.
pub fn decode_json<T: DeserializeOwned>(resource: &'static str, body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|source| ApiError::DecodeResult { resource, source })
}

/// One-line, length-bounded rendering of a body for log lines.
pub(crate) fn log_snippet(body: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(body).replace(['\n', '\t'], "");
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
