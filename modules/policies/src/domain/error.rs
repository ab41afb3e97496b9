//! Domain errors for the policies module.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

/// Upstream call that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStage {
    Token,
    Search,
    Details,
    DocumentList,
    Document,
}

impl UpstreamStage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamStage::Token => "token",
            UpstreamStage::Search => "search",
            UpstreamStage::Details => "details",
            UpstreamStage::DocumentList => "document list",
            UpstreamStage::Document => "document",
        }
    }
}

impl fmt::Display for UpstreamStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-level errors for policy operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Neither `externalPolicyNumber` nor `lastName` was supplied.
    #[error("invalid search parameters: externalPolicyNumber or lastName is required")]
    InvalidSearchParameters,

    /// The token endpoint answered non-2xx.
    #[error("upstream token endpoint returned HTTP {status}")]
    UpstreamAuth {
        status: StatusCode,
        body: Bytes,
        content_type: Option<String>,
    },

    /// The policy API answered non-2xx.
    #[error("upstream {stage} returned HTTP {status}")]
    UpstreamApi {
        stage: UpstreamStage,
        status: StatusCode,
        body: Bytes,
        content_type: Option<String>,
    },

    /// No answer within the configured timeout.
    #[error("upstream {stage} timed out after {timeout:?}")]
    UpstreamTimeout {
        stage: UpstreamStage,
        timeout: Duration,
    },

    /// Transport failure or an answer that could not be used.
    #[error("upstream {stage} unavailable: {message}")]
    UpstreamUnavailable {
        stage: UpstreamStage,
        message: String,
    },
}

impl DomainError {
    pub fn unavailable(stage: UpstreamStage, message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            stage,
            message: message.into(),
        }
    }
}
