//! Request bodies accepted by the executor

use reqwest::Method;
use serde::Serialize;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::errors::ApiError;

/// Body of an API call.
///
/// Every variant is turned into bytes exactly once, before the first attempt,
/// so retries resend identical content. A [`Payload::Reader`] is drained to
/// the end at that point.
#[derive(Default)]
pub enum Payload {
    /// No body
    #[default]
    Empty,
    /// Raw bytes sent as-is
    Bytes(Vec<u8>),
    /// Streaming source, buffered eagerly
    Reader(Box<dyn AsyncRead + Send + Unpin>),
    /// Structure encoded as JSON
    Json(serde_json::Value),
}

impl Payload {
    /// Encode any serializable value as a JSON payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Json)
    }

    /// Wrap a streaming source
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::Reader(Box::new(reader))
    }

    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Produce the bytes to send, or `None` for no body
    pub(crate) async fn encode(self, method: &Method, path: &str) -> Result<Option<Vec<u8>>, ApiError> {
        match self {
            Self::Empty => Ok(None),
            Self::Bytes(bytes) => Ok(Some(bytes)),
            Self::Json(value) => serde_json::to_vec(&value)
                .map(Some)
                .map_err(|source| ApiError::EncodePayload {
                    method: method.clone(),
                    path: path.to_string(),
                    source,
                }),
            Self::Reader(mut reader) => {
                let mut buffer = Vec::new();
                reader
                    .read_to_end(&mut buffer)
                    .await
                    .map_err(|source| ApiError::ReadPayload {
                        method: method.clone(),
                        path: path.to_string(),
                        source,
                    })?;
                Ok(Some(buffer))
            }
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Self::Reader(_) => f.write_str("Reader(..)"),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Bytes(text.into_bytes())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl<T> From<Option<T>> for Payload
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "source closed")))
        }
    }

    #[tokio::test]
    async fn test_empty_payload_has_no_body() {
        let body = Payload::Empty.encode(&Method::GET, "/zones").await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_json_payload_is_encoded() {
        let payload = Payload::json(&serde_json::json!({"name": "example.com"})).unwrap();
        let body = payload.encode(&Method::POST, "/zones").await.unwrap().unwrap();
        assert_eq!(body, br#"{"name":"example.com"}"#.to_vec());
    }

    #[tokio::test]
    async fn test_reader_payload_is_buffered() {
        let payload = Payload::reader(&b"streamed body"[..]);
        let body = payload.encode(&Method::PUT, "/upload").await.unwrap();
        assert_eq!(body.as_deref(), Some(&b"streamed body"[..]));
    }

    #[tokio::test]
    async fn test_reader_failure_is_reported_with_context() {
        let err = Payload::reader(FailingReader)
            .encode(&Method::PUT, "/upload")
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::ReadPayload { .. }));
        assert!(err.to_string().contains("PUT /upload"));
    }

    #[test]
    fn test_conversions() {
        assert!(Payload::from(None::<Vec<u8>>).is_empty());
        assert!(matches!(Payload::from("raw".to_string()), Payload::Bytes(_)));
        assert!(matches!(
            Payload::from(Some(serde_json::json!({}))),
            Payload::Json(_)
        ));
        assert_eq!(format!("{:?}", Payload::from(vec![1, 2, 3])), "Bytes(3 bytes)");
    }
}
