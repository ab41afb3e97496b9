use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Errors returned by the client credentials flow.
///
/// Secret values (`client_secret`, access tokens) never appear in the
/// formatted output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TokenError {
    /// The token endpoint answered with a non-2xx status.
    ///
    /// Status and body are kept as received so they can be relayed to the
    /// caller. The body is not part of the `Display` output.
    #[error("OAuth2 token endpoint returned HTTP {status}")]
    Upstream {
        status: StatusCode,
        body: Bytes,
        content_type: Option<String>,
    },

    /// No answer within the configured timeout.
    #[error("OAuth2 token request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport or request-building failure.
    ///
    /// The inner string comes from
    /// [`format_http_error`](crate::http_error::format_http_error).
    #[error("{0}")]
    Http(String),

    /// The token endpoint returned an unparseable or incomplete response.
    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    /// The token endpoint returned a `token_type` that is not `Bearer`.
    #[error("unsupported token type: {0}")]
    UnsupportedTokenType(String),

    /// Configuration is invalid.
    #[error("OAuth2 config error: {0}")]
    ConfigError(String),
}

impl From<gateway_http::HttpError> for TokenError {
    fn from(e: gateway_http::HttpError) -> Self {
        use gateway_http::HttpError;

        match e {
            HttpError::HttpStatus {
                status,
                body,
                content_type,
            } => TokenError::Upstream {
                status,
                body,
                content_type,
            },
            HttpError::Timeout(duration) => TokenError::Timeout(duration),
            HttpError::Json(err) => TokenError::InvalidResponse(err.to_string()),
            other => TokenError::Http(crate::http_error::format_http_error(&other, "OAuth2 token")),
        }
    }
}
