//! REST DTOs for the policies API.

use serde::{Deserialize, Serialize};

use crate::config::Environment;

/// Query parameters of `GET /policies`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub external_policy_number: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
}

/// Body of the 400 answer for an unusable search.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidParametersResponse {
    pub error: &'static str,
    pub detail: InvalidParametersDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct InvalidParametersDetail {
    pub accepted: &'static str,
    pub expected: &'static str,
}

impl Default for InvalidParametersResponse {
    fn default() -> Self {
        Self {
            error: "Invalid parameters.",
            detail: InvalidParametersDetail {
                accepted: "externalPolicyNumber, firstName, lastName",
                expected: "externalPolicyNumber or lastName",
            },
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: Environment,
}
