use reqwest::Method;
use std::fmt;
use thiserror::Error;

use super::rate_limiter::RateLimitError;
use crate::domain::models::ResponseInfo;

/// Suspension point at which a call was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortStage {
    /// Sleeping between attempts
    Backoff,
    /// Waiting on the network
    Request,
}

impl fmt::Display for AbortStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backoff => f.write_str("backoff"),
            Self::Request => f.write_str("request"),
        }
    }
}

/// Errors that can occur when interacting with the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Neither a token, an API key nor a user service key is configured
    #[error("no user credentials provided")]
    NoCredentials,

    /// Both an API key and a token were configured
    #[error("API key and tokens are mutually exclusive")]
    ConflictingCredentials,

    /// Base URL could not be resolved
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// A configured header name or value is not valid HTTP
    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Retry policy bounds are inconsistent
    #[error("invalid retry policy: {0}")]
    InvalidRetryPolicy(String),

    /// The HTTP transport could not be constructed
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    /// Payload could not be encoded as JSON
    #[error("error marshalling params to JSON for {method} {path}")]
    EncodePayload {
        method: Method,
        path: String,
        source: serde_json::Error,
    },

    /// Streaming payload could not be read
    #[error("error reading request body for {method} {path}")]
    ReadPayload {
        method: Method,
        path: String,
        source: std::io::Error,
    },

    /// The caller cancelled while the call was suspended
    #[error("operation aborted during {stage} for {method} {path}")]
    Aborted {
        stage: AbortStage,
        method: Method,
        path: String,
    },

    /// Waiting for a rate limit token failed
    #[error("error caused by request rate limiting")]
    RateLimited(#[from] RateLimitError),

    /// Connection, TLS or timeout failure
    #[error("HTTP request failed for {method} {path}")]
    Transport {
        method: Method,
        path: String,
        source: reqwest::Error,
    },

    /// The response body could not be read
    #[error("could not read response body for {method} {path}")]
    ReadBody {
        method: Method,
        path: String,
        source: reqwest::Error,
    },

    /// Raw error text from the expression validation endpoint
    #[error("{0}")]
    ExpressionValidation(String),

    /// Status above 500 that survived every retry
    #[error("HTTP status {status}: service failure")]
    ServiceFailure { status: u16 },

    /// An error status whose body is not a valid envelope
    #[error("error unmarshalling the JSON response error body (HTTP status {status})")]
    DecodeErrorBody {
        status: u16,
        source: serde_json::Error,
    },

    /// Structured error returned by the API
    #[error(transparent)]
    Request(#[from] ApiRequestError),

    /// A successful body did not match the expected result shape
    #[error("failed to unmarshal {resource} JSON data")]
    DecodeResult {
        resource: &'static str,
        source: serde_json::Error,
    },

    /// Identifier rejected before any request was made
    #[error("invalid {kind} identifier: {id}")]
    InvalidIdentifier { kind: &'static str, id: String },
}

impl ApiError {
    /// Returns true for errors raised before any network I/O because of
    /// client configuration
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::NoCredentials
                | Self::ConflictingCredentials
                | Self::InvalidBaseUrl { .. }
                | Self::InvalidHeader { .. }
                | Self::InvalidRetryPolicy(_)
                | Self::HttpClient(_)
        )
    }

    /// Returns true if the caller's cancellation ended the call
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Aborted { .. } | Self::RateLimited(RateLimitError::Cancelled)
        )
    }

    /// The structured API error, if this is one
    pub fn as_request_error(&self) -> Option<&ApiRequestError> {
        match self {
            Self::Request(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status associated with this error, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request(err) => Some(err.status_code),
            Self::ServiceFailure { status } | Self::DecodeErrorBody { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Terminal error built from an error envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequestError {
    /// HTTP status of the final response
    pub status_code: u16,
    /// Errors listed in the envelope, in order
    pub errors: Vec<ResponseInfo>,
    /// Value of the `cf-ray` header, empty when absent
    pub ray_id: String,
}

impl ApiRequestError {
    /// Error codes in envelope order
    pub fn error_codes(&self) -> Vec<i64> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// Error messages in envelope order
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// True if any error carries `code`
    pub fn has_error_code(&self, code: i64) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Trace id for support requests
    pub fn ray_id(&self) -> &str {
        &self.ray_id
    }

    pub const fn is_client_error(&self) -> bool {
        self.status_code >= 400 && self.status_code < 500
    }

    pub const fn is_server_error(&self) -> bool {
        self.status_code >= 500
    }
}

impl fmt::Display for ApiRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP status {}", self.status_code)?;

        if self.errors.is_empty() {
            f.write_str(": request failed")?;
        } else {
            let details: Vec<String> = self
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect();
            write!(f, ": {}", details.join(", "))?;
        }

        if !self.ray_id.is_empty() {
            write!(f, " [ray id: {}]", self.ray_id)?;
        }

        Ok(())
    }
}

impl std::error::Error for ApiRequestError {}
