//! REST route registration for the policies API.

use std::sync::Arc;

use axum::routing::get;
use axum::{Extension, Router};

use super::handlers;
use crate::config::Environment;
use crate::domain::service::Service;

/// Build the router for all policy endpoints and the health probe.
pub fn router(service: Arc<Service>, environment: Environment) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/policies", get(handlers::search_policies))
        .route("/policies/{id}", get(handlers::get_policy))
        .route("/policies/{id}/documents", get(handlers::get_policy_documents))
        .layer(Extension(service))
        .layer(Extension(environment))
}
