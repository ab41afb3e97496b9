use base64::{Engine as _, engine::general_purpose};
use gateway_http::HttpClient;
use http::header::AUTHORIZATION;
use zeroize::Zeroizing;

use super::config::OAuthClientConfig;
use super::error::TokenError;
use super::token::AccessToken;
use super::types::{ClientAuthMethod, TokenResponse};

/// Exchanges client credentials for an access token.
///
/// Every [`acquire_token`](Self::acquire_token) call performs one request;
/// nothing is cached and nothing is retried.
#[derive(Debug, Clone)]
pub struct TokenClient {
    client: HttpClient,
    config: OAuthClientConfig,
}

impl TokenClient {
    /// Build a token client on top of a shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigError`] if the configuration is invalid.
    pub fn new(client: HttpClient, config: OAuthClientConfig) -> Result<Self, TokenError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// Request a fresh access token.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Upstream`] when the endpoint answers non-2xx
    /// - [`TokenError::Timeout`] when no answer arrives in time
    /// - [`TokenError::InvalidResponse`] when the body is not JSON or carries
    ///   no `access_token`
    /// - [`TokenError::UnsupportedTokenType`] when `token_type` is not `Bearer`
    /// - [`TokenError::Http`] for transport failures
    #[tracing::instrument(
        name = "oauth2.acquire_token",
        skip(self),
        fields(endpoint = %self.config.token_endpoint)
    )]
    pub async fn acquire_token(&self) -> Result<AccessToken, TokenError> {
        let mut fields: Vec<(&str, &str)> = vec![("grant_type", self.config.grant_type.as_str())];

        // Form auth: credentials travel in the body. The temporary copy is
        // scrubbed on drop.
        let secret_expose;
        if self.config.auth_method == ClientAuthMethod::Form {
            secret_expose = Zeroizing::new(self.config.client_secret.expose().to_owned());
            fields.push(("client_id", &self.config.client_id));
            fields.push(("client_secret", &secret_expose));
        }

        let mut builder = self
            .client
            .post(self.config.token_endpoint.as_str())
            .header("accept", "application/json")
            .timeout(self.config.timeout);

        if self.config.auth_method == ClientAuthMethod::Basic {
            let credentials = Zeroizing::new(format!(
                "{}:{}",
                self.config.client_id,
                self.config.client_secret.expose()
            ));
            let encoded = Zeroizing::new(general_purpose::STANDARD.encode(credentials.as_bytes()));
            let header_value = Zeroizing::new(format!("Basic {}", &*encoded));
            builder = builder.sensitive_header(AUTHORIZATION.as_str(), &header_value);
        }

        let response = builder.form(fields.as_slice())?.send().await?;
        let token_resp: TokenResponse = response.json()?;

        if let Some(ref tt) = token_resp.token_type
            && !tt.eq_ignore_ascii_case("bearer")
        {
            return Err(TokenError::UnsupportedTokenType(tt.clone()));
        }

        let Some(access_token) = token_resp.access_token.filter(|t| !t.is_empty()) else {
            return Err(TokenError::InvalidResponse(
                "access_token missing from token response".into(),
            ));
        };

        tracing::debug!("access token acquired");
        Ok(AccessToken::new(access_token))
    }
}
