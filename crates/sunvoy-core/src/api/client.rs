//! HTTP client carrying the session cookie.
//!
//! This module provides the `AuthenticatedClient` struct, the one value that
//! holds the current session. It is created once the session is known and
//! passed explicitly to everything that talks to the site.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, redirect, Client, Response, Url};
use tracing::debug;

use crate::auth::SessionCredential;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for plain authenticated GET requests.
/// The login POST is deliberately left unbounded.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("sunvoy/", env!("CARGO_PKG_VERSION"));

/// Build the shared reqwest client.
///
/// Redirects are never followed: the login response is a redirect whose own
/// `Set-Cookie` headers must be read, and an expired session shows up as a
/// redirect to the login page rather than a 200.
pub fn build_http_client() -> Result<Client> {
    let client = Client::builder()
        .redirect(redirect::Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")?;
    Ok(client)
}

/// Resolve `path` against the site root
pub(crate) fn site_url(base_url: &Url, path: &str) -> Result<Url, ApiError> {
    base_url
        .join(path)
        .map_err(|e| ApiError::InvalidUrl(format!("{}{}: {}", base_url, path, e)))
}

/// A request-issuing capability bound to one session credential.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone, Debug)]
pub struct AuthenticatedClient {
    client: Client,
    base_url: Url,
    credential: SessionCredential,
}

impl AuthenticatedClient {
    pub fn new(client: Client, base_url: Url, credential: SessionCredential) -> Self {
        Self {
            client,
            base_url,
            credential,
        }
    }

    pub fn credential(&self) -> &SessionCredential {
        &self.credential
    }

    /// Absolute URL for a site path such as `/list`
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        site_url(&self.base_url, path)
    }

    /// Headers a renderer must send so that rendered pages are authenticated
    pub fn render_headers(&self) -> Vec<(String, String)> {
        vec![(
            header::COOKIE.as_str().to_string(),
            self.credential.as_str().to_string(),
        )]
    }

    /// GET a site path with the session cookie attached.
    ///
    /// Returns the raw response whatever its status; callers decide what
    /// counts as success.
    pub async fn get(&self, path: &str) -> Result<Response, ApiError> {
        let url = self.url(path)?;
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(header::COOKIE, self.credential.as_str())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .send()
            .await?;
        Ok(response)
    }
}
