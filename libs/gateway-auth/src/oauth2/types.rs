use serde::{Deserialize, Serialize};

/// `OAuth2` client authentication method.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientAuthMethod {
    /// `client_id` and `client_secret` as form fields next to `grant_type`.
    #[default]
    Form,
    /// `Authorization: Basic base64(client_id:client_secret)`
    Basic,
}

/// Deserialized token endpoint response.
///
/// `Deserialize`-only so an access token can never be serialized back out.
/// Unknown fields are ignored.
#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_auth_method_is_form() {
        assert_eq!(ClientAuthMethod::default(), ClientAuthMethod::Form);
    }

    #[test]
    fn auth_method_deserializes_lowercase() {
        let m: ClientAuthMethod = serde_json::from_str(r#""basic""#).unwrap();
        assert_eq!(m, ClientAuthMethod::Basic);
    }

    #[test]
    fn deserialize_response_ignores_unknown_fields() {
        let json = r#"{"access_token":"tok","token_type":"Bearer","expires_in":3599,"issued_at":"1"}"#;
        let r: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(r.access_token.as_deref(), Some("tok"));
        assert_eq!(r.token_type.as_deref(), Some("Bearer"));
    }

    #[test]
    fn deserialize_response_without_token() {
        let r: TokenResponse = serde_json::from_str(r#"{"status":"approved"}"#).unwrap();
        assert!(r.access_token.is_none());
    }
}
