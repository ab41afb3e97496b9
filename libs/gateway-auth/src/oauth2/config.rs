use std::fmt;
use std::time::Duration;
use url::Url;

use super::error::TokenError;
use super::types::ClientAuthMethod;
use crate::SecretString;

/// Configuration for the client credentials token request.
pub struct OAuthClientConfig {
    /// Absolute token endpoint URL.
    pub token_endpoint: Url,

    /// Value of the `grant_type` form field.
    pub grant_type: String,

    pub client_id: String,

    pub client_secret: SecretString,

    pub auth_method: ClientAuthMethod,

    /// Timeout for the token request.
    pub timeout: Duration,
}

impl OAuthClientConfig {
    /// Config with the required fields set and defaults for everything else.
    pub fn new(token_endpoint: Url, client_id: impl Into<String>, client_secret: SecretString) -> Self {
        Self {
            token_endpoint,
            grant_type: "client_credentials".to_owned(),
            client_id: client_id.into(),
            client_secret,
            auth_method: ClientAuthMethod::default(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::ConfigError`] if `client_id`, `client_secret` or
    /// `grant_type` is empty.
    pub fn validate(&self) -> Result<(), TokenError> {
        if self.client_id.trim().is_empty() {
            return Err(TokenError::ConfigError(
                "client_id must not be empty".into(),
            ));
        }
        if self.client_secret.is_empty() {
            return Err(TokenError::ConfigError(
                "client_secret must not be empty".into(),
            ));
        }
        if self.grant_type.trim().is_empty() {
            return Err(TokenError::ConfigError(
                "grant_type must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Clone for OAuthClientConfig {
    fn clone(&self) -> Self {
        Self {
            token_endpoint: self.token_endpoint.clone(),
            grant_type: self.grant_type.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_method: self.auth_method,
            timeout: self.timeout,
        }
    }
}

impl fmt::Debug for OAuthClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientConfig")
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("auth_method", &self.auth_method)
            .field("timeout", &self.timeout)
            .finish()
    }
}
