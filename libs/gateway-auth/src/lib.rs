#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! OAuth2 client credentials flow for the policy gateway.

pub mod http_error;
pub mod oauth2;
mod secret_string;

pub use oauth2::{AccessToken, ClientAuthMethod, OAuthClientConfig, TokenClient, TokenError};
pub use secret_string::SecretString;
