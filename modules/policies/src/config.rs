//! Policies module configuration and environment resolution.

use std::fmt;
use std::time::Duration;

use gateway_auth::{ClientAuthMethod, SecretString};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use url::Url;

/// Process variable that selects the deployment environment.
pub const ENVIRONMENT_VAR: &str = "ABS_ENV";

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Uat,
    Mntn,
    Prod,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Uat, Environment::Mntn, Environment::Prod];

    /// Resolve the environment from a raw value.
    ///
    /// Case-insensitive, otherwise exact: surrounding whitespace makes the
    /// value unrecognized. Absent or unrecognized values fall back to `uat`;
    /// an unrecognized value is logged at `warn`.
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|v| !v.is_empty()) else {
            return Environment::Uat;
        };
        let lowered = raw.to_ascii_lowercase();
        if let Some(env) = Self::ALL.into_iter().find(|e| e.as_str() == lowered) {
            env
        } else {
            tracing::warn!(
                value = %raw,
                fallback = Environment::Uat.as_str(),
                "unrecognized {ENVIRONMENT_VAR} value, falling back"
            );
            Environment::Uat
        }
    }

    /// Resolve the environment from the `ABS_ENV` process variable.
    #[must_use]
    pub fn from_process_env() -> Self {
        Self::resolve(std::env::var(ENVIRONMENT_VAR).ok().as_deref())
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Uat => "uat",
            Environment::Mntn => "mntn",
            Environment::Prod => "prod",
        }
    }

    #[must_use]
    pub fn is_production(self) -> bool {
        self == Environment::Prod
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policies module configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoliciesConfig {
    /// Upstream API base URL per environment.
    pub environments: EnvironmentServers,
    pub oauth: OAuthSettings,
    pub urls: UrlTemplates,
    pub timeouts: Timeouts,
    /// Value of the `subscriptionCountry` header sent upstream.
    pub subscription_country: String,
    /// Permit plain `http://` upstreams (local mocks only).
    pub allow_insecure_http: bool,
    /// Maximum upstream response body size in bytes.
    pub max_body_size: usize,
}

impl Default for PoliciesConfig {
    fn default() -> Self {
        Self {
            environments: EnvironmentServers::default(),
            oauth: OAuthSettings::default(),
            urls: UrlTemplates::default(),
            timeouts: Timeouts::default(),
            subscription_country: "EUR".to_owned(),
            allow_insecure_http: false,
            max_body_size: gateway_http::DEFAULT_MAX_BODY_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentServers {
    pub uat: Option<String>,
    pub mntn: Option<String>,
    pub prod: Option<String>,
}

impl EnvironmentServers {
    #[must_use]
    pub fn get(&self, environment: Environment) -> Option<&str> {
        match environment {
            Environment::Uat => self.uat.as_deref(),
            Environment::Mntn => self.mntn.as_deref(),
            Environment::Prod => self.prod.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OAuthSettings {
    /// Token endpoint path, appended to the environment's server URL.
    pub resource: String,
    pub grant_type: String,
    pub auth_method: ClientAuthMethod,
    /// Credentials used when the environment is `prod`.
    pub prod: Credentials,
    /// Credentials used for every other environment.
    pub non_prod: Credentials,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            resource: "/oauth/client_credential/accesstoken".to_owned(),
            grant_type: "client_credentials".to_owned(),
            auth_method: ClientAuthMethod::Form,
            prod: Credentials::default(),
            non_prod: Credentials::default(),
        }
    }
}

impl OAuthSettings {
    /// Credential pair for the given environment.
    #[must_use]
    pub fn credentials_for(&self, environment: Environment) -> &Credentials {
        if environment.is_production() {
            &self.prod
        } else {
            &self.non_prod
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Credentials {
    pub client_id: String,
    #[serde(serialize_with = "serialize_redacted")]
    pub client_secret: SecretString,
}

/// Upstream path templates. `:id` and `:documentId` are placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlTemplates {
    pub search: String,
    pub details: String,
    pub documents: String,
    pub document: String,
}

impl Default for UrlTemplates {
    fn default() -> Self {
        Self {
            search: "/policies/v1/search".to_owned(),
            details: "/policies/v1/policies/:id".to_owned(),
            documents: "/policies/v1/policies/:id/documents".to_owned(),
            document: "/policies/v1/policies/:id/documents/:documentId".to_owned(),
        }
    }
}

/// Upstream call timeouts.
///
/// Accepts humantime strings (`5s`, `1m 30s`) or plain integers in
/// milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    /// Token request, document list, and each document fetch.
    #[serde(with = "duration_serde")]
    pub short: Duration,
    /// Search and details.
    #[serde(with = "duration_serde")]
    pub long: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_secs(5),
            long: Duration::from_secs(30),
        }
    }
}

/// Unset secrets stay empty so a missing value is still visible.
fn serialize_redacted<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if secret.is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("[REDACTED]")
    }
}

mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&humantime::format_duration(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Millis(u64),
            Text(String),
        }

        match Raw::deserialize(d)? {
            Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
            Raw::Text(text) => humantime::parse_duration(&text).map_err(de::Error::custom),
        }
    }
}

/// Errors detected while resolving the configuration at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no upstream server configured for environment '{environment}'")]
    MissingServer { environment: Environment },

    #[error("invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{field} must not be empty for environment '{environment}'")]
    MissingCredential {
        field: &'static str,
        environment: Environment,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("timeout {field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Immutable settings for one environment, built once at startup.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub environment: Environment,
    pub base_url: Url,
    pub token_endpoint: Url,
    pub grant_type: String,
    pub auth_method: ClientAuthMethod,
    pub credentials: Credentials,
    /// Absolute URL templates (base URL joined with the configured paths).
    pub search_url: String,
    pub details_url: String,
    pub documents_url: String,
    pub document_url: String,
    pub timeouts: Timeouts,
    pub subscription_country: String,
    pub allow_insecure_http: bool,
    pub max_body_size: usize,
}

impl PoliciesConfig {
    /// Derive the settings for `environment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the environment has no server URL, a URL
    /// does not parse, the active credential pair is incomplete, or a timeout
    /// is zero.
    pub fn resolve(&self, environment: Environment) -> Result<ResolvedConfig, ConfigError> {
        let server = self
            .environments
            .get(environment)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingServer { environment })?;

        let base_url = Url::parse(server).map_err(|e| ConfigError::InvalidUrl {
            field: "environments",
            reason: e.to_string(),
        })?;

        let token_endpoint_raw = join_url(server, &self.oauth.resource);
        let token_endpoint =
            Url::parse(&token_endpoint_raw).map_err(|e| ConfigError::InvalidUrl {
                field: "oauth.resource",
                reason: e.to_string(),
            })?;

        let credentials = self.oauth.credentials_for(environment);
        if credentials.client_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential {
                field: "client_id",
                environment,
            });
        }
        if credentials.client_secret.is_empty() {
            return Err(ConfigError::MissingCredential {
                field: "client_secret",
                environment,
            });
        }
        if self.oauth.grant_type.trim().is_empty() {
            return Err(ConfigError::Empty {
                field: "oauth.grant_type",
            });
        }

        let templates = [
            ("urls.search", &self.urls.search),
            ("urls.details", &self.urls.details),
            ("urls.documents", &self.urls.documents),
            ("urls.document", &self.urls.document),
        ];
        for (field, template) in templates {
            if template.trim().is_empty() {
                return Err(ConfigError::Empty { field });
            }
        }

        if self.timeouts.short.is_zero() {
            return Err(ConfigError::ZeroTimeout { field: "short" });
        }
        if self.timeouts.long.is_zero() {
            return Err(ConfigError::ZeroTimeout { field: "long" });
        }

        Ok(ResolvedConfig {
            environment,
            base_url,
            token_endpoint,
            grant_type: self.oauth.grant_type.clone(),
            auth_method: self.oauth.auth_method,
            credentials: credentials.clone(),
            search_url: join_url(server, &self.urls.search),
            details_url: join_url(server, &self.urls.details),
            documents_url: join_url(server, &self.urls.documents),
            document_url: join_url(server, &self.urls.document),
            timeouts: self.timeouts,
            subscription_country: self.subscription_country.clone(),
            allow_insecure_http: self.allow_insecure_http,
            max_body_size: self.max_body_size,
        })
    }
}

/// Concatenate a server URL and a path with exactly one `/` between them.
fn join_url(server: &str, path: &str) -> String {
    let server = server.trim_end_matches('/');
    let path = path.trim();
    if path.starts_with('/') {
        format!("{server}{path}")
    } else {
        format!("{server}/{path}")
    }
}
