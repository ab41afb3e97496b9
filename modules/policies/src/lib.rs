#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Policy lookups over an OAuth2-protected upstream policy API.
//!
//! ```text
//!        GET /policies, /policies/{id}, /policies/{id}/documents
//!                              │
//!                              ▼
//!              ┌───────────────────────────────┐
//!              │  REST API (api::rest)         │
//!              └───────────────────────────────┘
//!                              │
//!                              ▼
//!              ┌───────────────────────────────┐
//!              │  Domain service               │
//!              │  - CONTRACT filter            │
//!              │  - document fan-out           │
//!              └───────────────────────────────┘
//!                              │ PolicyUpstream
//!                              ▼
//!              ┌───────────────────────────────┐
//!              │  HttpPolicyUpstream (infra)   │
//!              │  token endpoint + policy API  │
//!              └───────────────────────────────┘
//! ```

pub mod module;
pub use module::PoliciesModule;

pub mod config;
pub use config::{Environment, PoliciesConfig, ResolvedConfig};

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
