//! REST error mapping for the policies API.
//!
//! Upstream non-2xx answers are relayed unchanged. Failures the gateway
//! detects on its own (timeouts, unreachable or malformed upstream) become
//! Problem Details.

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use http::header::CONTENT_TYPE;

use super::dto::InvalidParametersResponse;
use super::problem::Problem;
use crate::domain::error::DomainError;

const ERROR_TYPE_BASE: &str = "https://errors.policy-gateway.local";

/// Result type for REST handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// A domain failure tagged with the span it was raised in.
///
/// The conversion from [`DomainError`] runs through `?` inside the
/// instrumented handler, so the span id still belongs to that handler when
/// it is captured. Rendering happens later, after the span has exited.
#[derive(Debug)]
pub struct ApiError {
    pub error: DomainError,
    pub span_id: Option<String>,
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        let span_id = tracing::Span::current()
            .id()
            .map(|id| id.into_u64().to_string());
        Self { error, span_id }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let span_id = self.span_id;
        match self.error {
            DomainError::InvalidSearchParameters => (
                StatusCode::BAD_REQUEST,
                axum::Json(InvalidParametersResponse::default()),
            )
                .into_response(),
            DomainError::UpstreamAuth {
                status,
                body,
                content_type,
            } => {
                tracing::warn!(status = %status, "token endpoint rejected the request");
                passthrough(status, body, content_type.as_deref())
            }
            DomainError::UpstreamApi {
                stage,
                status,
                body,
                content_type,
            } => {
                tracing::warn!(stage = %stage, status = %status, "policy API returned an error");
                passthrough(status, body, content_type.as_deref())
            }
            DomainError::UpstreamTimeout { stage, timeout } => {
                tracing::error!(stage = %stage, timeout = ?timeout, "upstream call timed out");
                problem(
                    span_id,
                    StatusCode::GATEWAY_TIMEOUT,
                    "POLICY_UPSTREAM_TIMEOUT",
                    "Upstream timeout",
                    format!("The upstream {stage} call did not answer within {timeout:?}"),
                )
            }
            DomainError::UpstreamUnavailable { stage, message } => {
                tracing::error!(stage = %stage, error = %message, "upstream call failed");
                problem(
                    span_id,
                    StatusCode::BAD_GATEWAY,
                    "POLICY_UPSTREAM_UNAVAILABLE",
                    "Upstream unavailable",
                    format!("The upstream {stage} call failed"),
                )
            }
        }
    }
}

fn passthrough(status: StatusCode, body: bytes::Bytes, content_type: Option<&str>) -> Response {
    let content_type = content_type
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));
    let mut resp = (status, body).into_response();
    resp.headers_mut().insert(CONTENT_TYPE, content_type);
    resp
}

fn problem(
    span_id: Option<String>,
    status: StatusCode,
    code: &str,
    title: &str,
    detail: String,
) -> Response {
    let mut problem = Problem::new(status, title, detail)
        .with_type(format!("{ERROR_TYPE_BASE}/{code}"))
        .with_code(code);
    if let Some(id) = span_id {
        problem = problem.with_span_id(id);
    }
    problem.into_response()
}
