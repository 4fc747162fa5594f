//! Nonce-based login.
//!
//! A single pass with no retries:
//! 1. render `/login` and read the script-populated nonce field
//! 2. POST username, password and nonce, expecting a 302
//! 3. reduce the redirect's `Set-Cookie` headers to one cookie header
//! 4. persist it

use anyhow::Result;
use reqwest::{header, Client, StatusCode, Url};
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::api::client::site_url;
use crate::api::ApiError;
use crate::render::{RenderOptions, Renderer};

use super::{AuthError, Identity, SessionCredential, SessionStore};

const LOGIN_PATH: &str = "/login";

/// Form field holding the one-time token
const NONCE_SELECTOR: &str = r#"input[name="nonce"]"#;

/// The only status the login endpoint answers with on success
const EXPECTED_STATUS: StatusCode = StatusCode::FOUND;

/// One-time token from the login form. Consumed by `submit`.
pub struct LoginNonce(String);

impl LoginNonce {
    fn into_inner(self) -> String {
        self.0
    }
}

/// Read the nonce from a rendered login page
pub fn find_nonce(html: &str) -> Option<LoginNonce> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(NONCE_SELECTOR).ok()?;
    document
        .select(&selector)
        .filter_map(|input| input.value().attr("value"))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(|value| LoginNonce(value.to_string()))
}

/// Join every `Set-Cookie` header into a single request cookie header.
///
/// Each header contributes its leading `name=value` segment; attributes such
/// as `Path` or `Expires` are dropped. Order follows the response.
pub fn derive_credential(headers: &header::HeaderMap) -> Result<SessionCredential, AuthError> {
    let pairs: Vec<&str> = headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(|cookie| cookie.split(';').next().unwrap_or_default().trim())
        .filter(|pair| !pair.is_empty())
        .collect();

    SessionCredential::new(pairs.join("; ")).ok_or(AuthError::NoCookies)
}

/// Performs a fresh login against the site.
pub struct LoginFlow<'a> {
    client: &'a Client,
    base_url: &'a Url,
    renderer: &'a dyn Renderer,
}

impl<'a> LoginFlow<'a> {
    pub fn new(client: &'a Client, base_url: &'a Url, renderer: &'a dyn Renderer) -> Self {
        Self {
            client,
            base_url,
            renderer,
        }
    }

    /// Run the whole flow and save the new credential to `store`.
    /// Nothing is written unless every step succeeds.
    pub async fn execute(
        &self,
        identity: &Identity,
        store: &SessionStore,
    ) -> Result<SessionCredential, AuthError> {
        let nonce = self.fetch_nonce().await?;
        let credential = self.submit(identity, nonce).await?;
        store.save(&credential).map_err(AuthError::Persist)?;
        info!(path = %store.path().display(), "Login successful and session saved");
        Ok(credential)
    }

    /// Render the login page (scripts included) and read the nonce
    pub async fn fetch_nonce(&self) -> Result<LoginNonce, AuthError> {
        let url = site_url(self.base_url, LOGIN_PATH)?;
        let html = self
            .renderer
            .render(url.as_str(), &[], RenderOptions::dom_ready())
            .await
            .map_err(AuthError::Render)?;

        let nonce = find_nonce(&html).ok_or(AuthError::NonceNotFound)?;
        debug!(renderer = self.renderer.name(), len = nonce.0.len(), "Nonce obtained");
        Ok(nonce)
    }

    /// POST the credentials and derive the session from the redirect
    pub async fn submit(
        &self,
        identity: &Identity,
        nonce: LoginNonce,
    ) -> Result<SessionCredential, AuthError> {
        let url = site_url(self.base_url, LOGIN_PATH)?;
        let nonce = nonce.into_inner();
        let form = [
            ("username", identity.username()),
            ("password", identity.password()),
            ("nonce", nonce.as_str()),
        ];

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status != EXPECTED_STATUS {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status,
                body: ApiError::truncate_body(&body),
            });
        }

        derive_credential(response.headers())
    }
}
