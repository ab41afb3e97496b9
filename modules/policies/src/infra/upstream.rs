//! HTTP adapter for the upstream policy API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gateway_auth::{AccessToken, OAuthClientConfig, TokenClient, TokenError};
use gateway_http::{HttpClient, HttpClientBuilder, HttpError, TransportSecurity};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::url_template;
use crate::config::ResolvedConfig;
use crate::domain::error::{DomainError, UpstreamStage};
use crate::domain::model::SearchCriteria;
use crate::domain::ports::PolicyUpstream;

/// [`PolicyUpstream`] over HTTP with `OAuth2` client credentials.
pub struct HttpPolicyUpstream {
    http: HttpClient,
    tokens: TokenClient,
    settings: Arc<ResolvedConfig>,
}

impl HttpPolicyUpstream {
    /// Build the adapter and its pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built (TLS setup) or the OAuth
    /// settings are invalid.
    pub fn new(settings: Arc<ResolvedConfig>) -> anyhow::Result<Self> {
        let transport = if settings.allow_insecure_http {
            TransportSecurity::AllowInsecureHttp
        } else {
            TransportSecurity::TlsOnly
        };
        let http = HttpClientBuilder::new()
            .transport(transport)
            .timeout(settings.timeouts.long)
            .max_body_size(settings.max_body_size)
            .build()?;

        let mut oauth = OAuthClientConfig::new(
            settings.token_endpoint.clone(),
            settings.credentials.client_id.clone(),
            settings.credentials.client_secret.clone(),
        );
        oauth.grant_type.clone_from(&settings.grant_type);
        oauth.auth_method = settings.auth_method;
        oauth.timeout = settings.timeouts.short;

        let tokens = TokenClient::new(http.clone(), oauth)?;

        Ok(Self {
            http,
            tokens,
            settings,
        })
    }

    /// GET `url` with the standard upstream headers and parse the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: UpstreamStage,
        url: &str,
        token: &AccessToken,
        timeout: Duration,
    ) -> Result<T, DomainError> {
        tracing::debug!(stage = %stage, url = %url, "calling upstream");
        let response = self
            .http
            .get(url)
            .header("accept", "application/json")
            .header("subscriptionCountry", &self.settings.subscription_country)
            .sensitive_header("authorization", &token.bearer_header())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_http_error(stage, e))?;

        response.json().map_err(|e| map_http_error(stage, e))
    }
}

#[async_trait]
impl PolicyUpstream for HttpPolicyUpstream {
    async fn acquire_token(&self) -> Result<AccessToken, DomainError> {
        self.tokens.acquire_token().await.map_err(map_token_error)
    }

    async fn search_policies(
        &self,
        token: &AccessToken,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Value>, DomainError> {
        let mut url = Url::parse(&self.settings.search_url)
            .map_err(|e| DomainError::unavailable(UpstreamStage::Search, e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in criteria.query_pairs() {
                query.append_pair(name, value);
            }
        }

        self.get_json(
            UpstreamStage::Search,
            url.as_str(),
            token,
            self.settings.timeouts.long,
        )
        .await
    }

    async fn policy_details(
        &self,
        token: &AccessToken,
        policy_id: &str,
    ) -> Result<Value, DomainError> {
        let url = url_template::render(&self.settings.details_url, &[("id", policy_id)]);
        self.get_json(
            UpstreamStage::Details,
            &url,
            token,
            self.settings.timeouts.long,
        )
        .await
    }

    async fn list_documents(
        &self,
        token: &AccessToken,
        policy_id: &str,
    ) -> Result<Vec<Value>, DomainError> {
        let url = url_template::render(&self.settings.documents_url, &[("id", policy_id)]);
        self.get_json(
            UpstreamStage::DocumentList,
            &url,
            token,
            self.settings.timeouts.short,
        )
        .await
    }

    async fn fetch_document(
        &self,
        token: &AccessToken,
        policy_id: &str,
        document_id: &str,
    ) -> Result<Value, DomainError> {
        let url = url_template::render(
            &self.settings.document_url,
            &[("id", policy_id), ("documentId", document_id)],
        );
        self.get_json(
            UpstreamStage::Document,
            &url,
            token,
            self.settings.timeouts.short,
        )
        .await
    }
}

fn map_http_error(stage: UpstreamStage, e: HttpError) -> DomainError {
    match e {
        HttpError::HttpStatus {
            status,
            body,
            content_type,
        } => DomainError::UpstreamApi {
            stage,
            status,
            body,
            content_type,
        },
        HttpError::Timeout(timeout) => DomainError::UpstreamTimeout { stage, timeout },
        HttpError::Json(err) => {
            DomainError::unavailable(stage, format!("malformed upstream response: {err}"))
        }
        other => DomainError::unavailable(
            stage,
            gateway_auth::http_error::format_http_error(&other, "policy API"),
        ),
    }
}

fn map_token_error(e: TokenError) -> DomainError {
    match e {
        TokenError::Upstream {
            status,
            body,
            content_type,
        } => DomainError::UpstreamAuth {
            status,
            body,
            content_type,
        },
        TokenError::Timeout(timeout) => DomainError::UpstreamTimeout {
            stage: UpstreamStage::Token,
            timeout,
        },
        other => DomainError::unavailable(UpstreamStage::Token, other.to_string()),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;

    #[test]
    fn http_status_maps_to_upstream_api() {
        let err = map_http_error(
            UpstreamStage::Details,
            HttpError::HttpStatus {
                status: StatusCode::NOT_FOUND,
                body: Bytes::from_static(b"{\"message\":\"no such policy\"}"),
                content_type: Some("application/json".to_owned()),
            },
        );
        match err {
            DomainError::UpstreamApi {
                stage,
                status,
                body,
                ..
            } => {
                assert_eq!(stage, UpstreamStage::Details);
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body.as_ref(), b"{\"message\":\"no such policy\"}");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn timeout_maps_to_upstream_timeout() {
        let err = map_http_error(
            UpstreamStage::Search,
            HttpError::Timeout(Duration::from_secs(30)),
        );
        assert!(matches!(
            err,
            DomainError::UpstreamTimeout {
                stage: UpstreamStage::Search,
                ..
            }
        ));
    }

    #[test]
    fn token_invalid_response_maps_to_unavailable() {
        let err = map_token_error(TokenError::InvalidResponse("no token".into()));
        assert!(matches!(
            err,
            DomainError::UpstreamUnavailable {
                stage: UpstreamStage::Token,
                ..
            }
        ));
    }
}
