//! Outbound `OAuth2` client credentials flow.
//!
//! One token request per [`TokenClient::acquire_token`] call; tokens are never
//! cached.

pub mod client;
pub mod config;
pub mod error;
pub mod token;
pub mod types;

pub use client::TokenClient;
pub use config::OAuthClientConfig;
pub use error::TokenError;
pub use token::AccessToken;
pub use types::ClientAuthMethod;
