//! Output ports for the domain service.

use async_trait::async_trait;
use gateway_auth::AccessToken;
use serde_json::Value;

use super::error::DomainError;
use super::model::SearchCriteria;

/// Upstream policy API, including token acquisition.
#[async_trait]
pub trait PolicyUpstream: Send + Sync {
    /// Obtain a fresh access token.
    async fn acquire_token(&self) -> Result<AccessToken, DomainError>;

    /// Raw search results.
    async fn search_policies(
        &self,
        token: &AccessToken,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Value>, DomainError>;

    /// The upstream details object (the wrapper around `policy`).
    async fn policy_details(&self, token: &AccessToken, policy_id: &str)
    -> Result<Value, DomainError>;

    /// Document references of a policy.
    async fn list_documents(
        &self,
        token: &AccessToken,
        policy_id: &str,
    ) -> Result<Vec<Value>, DomainError>;

    /// Content of one document.
    async fn fetch_document(
        &self,
        token: &AccessToken,
        policy_id: &str,
        document_id: &str,
    ) -> Result<Value, DomainError>;
}
