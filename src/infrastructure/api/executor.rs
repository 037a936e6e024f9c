//! Retry loop shared by every call a [`Client`] makes

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::client::Client;
use super::decoder::{decode_response, log_snippet, RAY_ID_HEADER};
use super::errors::{AbortStage, ApiError};
use super::payload::Payload;
use super::route::is_write_method;

const LOG_BODY_CHARS: usize = 512;

/// What the most recent attempt produced
enum Outcome {
    /// A full response, possibly an error status
    Response {
        status: StatusCode,
        ray_id: String,
        body: Vec<u8>,
    },
    /// The attempt ended without a usable response
    Failed(ApiError),
}

const fn is_retryable_status(status: StatusCode) -> bool {
    status.as_u16() == 429 || status.as_u16() >= 500
}

impl Client {
    /// Run one logical call: up to `max_retries + 1` attempts, each gated by
    /// the shared rate limiter, with backoff sleeps between them.
    ///
    /// Only transport failures, 429 and statuses of 500 and above are retried.
    /// Any other response is decoded immediately. When attempts run out the
    /// last response is decoded, or the last transport error is returned as is.
    #[instrument(skip(self, cancel, payload, extra))]
    pub(crate) async fn execute(
        &self,
        cancel: &CancellationToken,
        method: Method,
        path: &str,
        payload: Payload,
        extra: Option<&HeaderMap>,
    ) -> Result<Vec<u8>, ApiError> {
        // Fails before any sleep or network I/O when no credentials are set
        let headers = self.request_headers(extra)?;
        let body = payload.encode(&method, path).await?;
        let url = self.endpoint(path);

        let mut last: Option<Outcome> = None;

        for attempt in 0..=self.retry_policy.max_retries() {
            if attempt > 0 {
                let delay = self.retry_policy.backoff_for(attempt);
                let kind = if is_write_method(&method) { "write" } else { "read" };
                self.logger.log(format_args!(
                    "Sleeping {delay:?} before retry attempt number {attempt} for {kind} request {method} {path}"
                ));

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        return Err(aborted(AbortStage::Backoff, &method, path));
                    }
                    () = sleep(delay) => {}
                }
            }

            self.rate_limiter.acquire(cancel).await?;

            let mut request = self
                .http_client
                .request(method.clone(), &url)
                .headers(headers.clone());
            if let Some(bytes) = &body {
                request = request.body(bytes.clone());
            }

            debug!(attempt, "{} {}", method, url);

            let sent = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                sent = request.send() => Some(sent),
            };
            let Some(sent) = sent else {
                return Err(aborted(AbortStage::Request, &method, path));
            };

            let response = match sent {
                Ok(response) => response,
                Err(source) => {
                    self.logger.log(format_args!(
                        "Error performing request: {method} {path} : {source}"
                    ));
                    last = Some(Outcome::Failed(ApiError::Transport {
                        method: method.clone(),
                        path: path.to_string(),
                        source,
                    }));
                    continue;
                }
            };

            let status = response.status();
            let ray_id = response
                .headers()
                .get(RAY_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();

            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                read = response.bytes() => Some(read),
            };
            let Some(read) = read else {
                return Err(aborted(AbortStage::Request, &method, path));
            };

            let bytes = match read {
                Ok(bytes) => bytes.to_vec(),
                Err(source) => {
                    let err = ApiError::ReadBody {
                        method: method.clone(),
                        path: path.to_string(),
                        source,
                    };
                    if !is_retryable_status(status) {
                        return Err(err);
                    }
                    self.logger.log(format_args!(
                        "Request: {method} {path} got an error response {}: {err}",
                        status.as_u16()
                    ));
                    last = Some(Outcome::Failed(err));
                    continue;
                }
            };

            if !is_retryable_status(status) {
                return decode_response(path, status, &ray_id, bytes);
            }

            self.logger.log(format_args!(
                "Request: {method} {path} got an error response {}: {}",
                status.as_u16(),
                log_snippet(&bytes, LOG_BODY_CHARS)
            ));
            last = Some(Outcome::Response {
                status,
                ray_id,
                body: bytes,
            });
        }

        match last {
            Some(Outcome::Response {
                status,
                ray_id,
                body,
            }) => decode_response(path, status, &ray_id, body),
            Some(Outcome::Failed(err)) => Err(err),
            // The loop always runs at least once
            None => Err(aborted(AbortStage::Request, &method, path)),
        }
    }
}

fn aborted(stage: AbortStage, method: &Method, path: &str) -> ApiError {
    ApiError::Aborted {
        stage,
        method: method.clone(),
        path: path.to_string(),
    }
}
