//! Policies module definition.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::api::rest::routes;
use crate::config::{Environment, ResolvedConfig};
use crate::domain::ports::PolicyUpstream;
use crate::domain::service::Service;
use crate::infra::HttpPolicyUpstream;

/// Policies module: domain service wired to the HTTP upstream, plus its
/// REST surface.
pub struct PoliciesModule {
    service: Arc<Service>,
    environment: Environment,
}

impl PoliciesModule {
    /// Wire the module for an already resolved environment.
    ///
    /// # Errors
    ///
    /// Fails if the upstream HTTP client cannot be built.
    pub fn new(config: ResolvedConfig) -> anyhow::Result<Self> {
        let environment = config.environment;
        info!(
            environment = %environment,
            base_url = %config.base_url,
            "Initializing policies module"
        );

        let upstream: Arc<dyn PolicyUpstream> =
            Arc::new(HttpPolicyUpstream::new(Arc::new(config))?);
        Ok(Self::with_upstream(upstream, environment))
    }

    /// Wire the module over any upstream implementation.
    pub fn with_upstream(upstream: Arc<dyn PolicyUpstream>, environment: Environment) -> Self {
        Self {
            service: Arc::new(Service::new(upstream)),
            environment,
        }
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    #[must_use]
    pub fn service(&self) -> Arc<Service> {
        Arc::clone(&self.service)
    }

    /// REST routes of the module.
    pub fn router(&self) -> Router {
        routes::router(self.service(), self.environment)
    }
}
