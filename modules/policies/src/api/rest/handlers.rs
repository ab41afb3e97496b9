//! REST handlers for the policies API.
//!
//! Handlers are thin: validate input, call the domain service, let
//! [`ApiError`] render the failure.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Path, Query};
use serde_json::Value;

use super::dto::{HealthResponse, SearchParams};
use super::error::ApiResult;
use crate::config::Environment;
use crate::domain::error::DomainError;
use crate::domain::model::SearchCriteria;
use crate::domain::service::Service;

/// GET /health - Liveness probe.
pub async fn health(Extension(environment): Extension<Environment>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        environment,
    })
}

/// GET /policies - Search policies in the `CONTRACT` stage.
#[tracing::instrument(skip(svc, params))]
pub async fn search_policies(
    Extension(svc): Extension<Arc<Service>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Value>>> {
    let Query(params) = params.map_err(|e| {
        tracing::debug!(error = %e, "unreadable search query");
        DomainError::InvalidSearchParameters
    })?;
    let criteria = SearchCriteria::new(
        params.external_policy_number,
        params.last_name,
        params.first_name,
    )?;

    let policies = svc.search_policies(&criteria).await?;
    Ok(Json(policies))
}

/// GET /policies/{id} - Details of one policy.
#[tracing::instrument(skip(svc), fields(policy_id = %id))]
pub async fn get_policy(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let policy = svc.get_policy(&id).await?;
    Ok(Json(policy))
}

/// GET /policies/{id}/documents - Documents of one policy with content.
#[tracing::instrument(skip(svc), fields(policy_id = %id))]
pub async fn get_policy_documents(
    Extension(svc): Extension<Arc<Service>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let documents = svc.get_policy_documents(&id).await?;
    Ok(Json(documents))
}
