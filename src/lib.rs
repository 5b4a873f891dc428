//! Permission-gated request authorization for REST APIs.
//!
//! Verifies RS256 bearer tokens against an identity provider's rotating JWKS
//! and enforces exact permission membership before a protected operation runs.
//! The gate lives in [`services::auth`]; [`middleware::auth`] and
//! [`api::v1`] expose it over HTTP.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
