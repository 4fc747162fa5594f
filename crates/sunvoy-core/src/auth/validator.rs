use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use crate::api::AuthenticatedClient;

use super::SessionCredential;

/// Protected page used to probe the session
const VALIDATION_PATH: &str = "/settings";

/// Text only present on pages rendered for a logged-in user
const AUTHENTICATED_MARKER: &str = "Logout";

/// Checks whether a stored credential is still accepted by the site.
pub struct SessionValidator<'a> {
    client: &'a Client,
    base_url: &'a Url,
}

impl<'a> SessionValidator<'a> {
    pub fn new(client: &'a Client, base_url: &'a Url) -> Self {
        Self { client, base_url }
    }

    /// True only for a 200 whose body shows the logged-in marker.
    ///
    /// An expired session is routine, so every failure (transport error,
    /// other status, missing marker) is reported as `false`.
    pub async fn is_valid(&self, credential: &SessionCredential) -> bool {
        let probe = AuthenticatedClient::new(
            self.client.clone(),
            self.base_url.clone(),
            credential.clone(),
        );

        let response = match probe.get(VALIDATION_PATH).await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Session check request failed");
                return false;
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(%status, "Session rejected");
            return false;
        }

        match response.text().await {
            Ok(body) if body.contains(AUTHENTICATED_MARKER) => true,
            Ok(_) => {
                debug!("Session check page lacks the logged-in marker");
                false
            }
            Err(e) => {
                debug!(error = %e, "Failed to read session check body");
                false
            }
        }
    }
}
