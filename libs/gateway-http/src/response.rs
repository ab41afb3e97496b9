use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;

/// Collect a response body, failing once more than `limit` bytes arrive.
pub(crate) async fn read_body_limited(
    body: hyper::body::Incoming,
    limit: usize,
) -> Result<Bytes, HttpError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(HttpError::BodyTooLarge { limit }),
        Err(e) => Err(HttpError::Transport(e)),
    }
}

/// Fully buffered HTTP response
///
/// The body has already been read (within the size limit and the request
/// timeout) when this value is handed out.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response status code
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// `Content-Type` header, when present and valid UTF-8
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Return an error for non-2xx responses.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::HttpStatus` carrying the status, the complete body,
    /// and the content type when the status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.status.is_success() {
            return Ok(self);
        }

        let content_type = self.content_type().map(str::to_owned);
        Err(HttpError::HttpStatus {
            status: self.status,
            body: self.body,
            content_type,
        })
    }

    /// Parse the body as JSON after a status check.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::Json` if parsing fails.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let resp = self.error_for_status()?;
        Ok(serde_json::from_slice(&resp.body)?)
    }
}
