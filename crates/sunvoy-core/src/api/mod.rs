//! Authenticated HTTP access to the site.
//!
//! This module provides the `AuthenticatedClient`, which carries the current
//! session cookie on every plain HTTP request and hands the same cookie to
//! any renderer used for scraping.
//!
//! The session cookie is obtained by the login flow in `crate::auth`.

pub mod client;
pub mod error;

pub use client::{build_http_client, AuthenticatedClient};
pub use error::ApiError;
